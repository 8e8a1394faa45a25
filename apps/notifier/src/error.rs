//! # Notifier エラー定義
//!
//! 公開通知の処理中に発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! 通知処理のエラーは公開操作に伝播させない。HTTP レスポンスに変換されるのは
//! 受信したイベント自体が不正な場合のみで、宛先解決や送信の失敗は
//! 通知サービス内部でログ出力して握りつぶす。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pubnotify_domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// エラーレスポンス（RFC 7807 Problem Details）
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

/// イベント受信エンドポイントが返すエラー
#[derive(Debug, Error)]
pub enum NotifierError {
    /// 受信したイベントが不正
    #[error("不正なイベント: {0}")]
    InvalidEvent(#[source] DomainError),
}

impl IntoResponse for NotifierError {
    fn into_response(self) -> Response {
        let (status, error_type, title) = match &self {
            NotifierError::InvalidEvent(_) => (
                StatusCode::BAD_REQUEST,
                "https://pubnotify.example.com/errors/bad-request",
                "Bad Request",
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error_type: error_type.to_string(),
                title: title.to_string(),
                status: status.as_u16(),
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
