//! # HTTP ハンドラ
//!
//! Notifier の HTTP エンドポイントを定義する。
//!
//! ## エンドポイント
//!
//! - `GET /health` - ヘルスチェック
//! - `POST /internal/events/post-published` - 投稿公開イベントの受信

pub mod event;
pub mod health;

pub use event::{EventState, post_published};
pub use health::health_check;
