//! # Notifier アプリケーション構築
//!
//! State の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{EventState, health_check, post_published},
    usecase::PostPublishedHandler,
};

/// ルーターを構築する
///
/// 公開イベントのハンドラを受け取り、State → Router の順に組み立てる。
pub fn build_app(handler: Arc<dyn PostPublishedHandler>) -> Router {
    let event_state = Arc::new(EventState { handler });

    Router::new()
        .route("/health", get(health_check))
        .route("/internal/events/post-published", post(post_published))
        .with_state(event_state)
        .layer(TraceLayer::new_for_http())
}

/// `NOTIFIER_HOST` と `NOTIFIER_PORT` でリッスンする
///
/// ホスト名は名前解決してからバインドするため、`localhost` や IPv6 アドレスも受け付ける。
pub async fn bind_listener(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("127.0.0.1")]
    #[case("localhost")]
    #[tokio::test]
    async fn test_ホスト名でもバインドできる(#[case] host: &str) {
        let listener = bind_listener(host, 0).await.unwrap();

        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_解決できないホストはエラー() {
        let result = bind_listener("no-such-host.invalid", 0).await;

        assert!(result.is_err());
    }
}
