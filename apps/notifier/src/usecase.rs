//! # ユースケース層
//!
//! ハンドラから呼び出されるアプリケーションロジックを配置する。

pub mod notification;

pub use notification::{
    NotificationOutcome,
    NotificationService,
    PostPublishedHandler,
    RecipientResolver,
    TemplateRenderer,
};
