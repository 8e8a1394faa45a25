//! # 通知ユースケース
//!
//! 投稿公開に伴うメール通知の宛先解決・生成・送信を統合する。
//!
//! ## モジュール構成
//!
//! - [`recipients`] - 投稿者とサイト管理者からの宛先リスト組み立て
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`service`] - 宛先解決 + レンダリング + 送信の統合サービス

pub mod recipients;
pub mod service;
pub mod template_renderer;

pub use recipients::RecipientResolver;
pub use service::{NotificationOutcome, NotificationService, PostPublishedHandler};
pub use template_renderer::TemplateRenderer;
