//! # 投稿公開イベントハンドラ
//!
//! プラットフォームから投稿公開イベントを受け取り、公開通知を起動する。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /internal/events/post-published
//! ```
//!
//! ## リクエスト例
//!
//! ```json
//! {
//!   "post_id": 42,
//!   "post": {
//!     "id": 42,
//!     "title": "Hello",
//!     "author_id": 7,
//!     "permalink": "https://blog.example.com/?p=42"
//!   }
//! }
//! ```
//!
//! 通知の成否に関わらず `204 No Content` を返す。公開操作を失敗させないため、
//! 非 2xx を返すのはイベント自体が不正な場合（400）のみ。

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use pubnotify_domain::post::PostPublished;

use crate::{error::NotifierError, usecase::PostPublishedHandler};

/// イベントハンドラの共有状態
pub struct EventState {
    pub handler: Arc<dyn PostPublishedHandler>,
}

/// 投稿公開イベントを受信する
#[tracing::instrument(skip_all)]
pub async fn post_published(
    State(state): State<Arc<EventState>>,
    Json(event): Json<PostPublished>,
) -> Result<StatusCode, NotifierError> {
    event.validate().map_err(NotifierError::InvalidEvent)?;

    state.handler.on_post_published(&event).await;

    Ok(StatusCode::NO_CONTENT)
}
