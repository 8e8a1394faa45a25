//! # Notifier サーバー
//!
//! 投稿公開イベントを受け取り、投稿者とサイト管理者に公開通知メールを送る。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit 向け）
//! NOTIFICATION_BACKEND=smtp cargo run -p pubnotify-notifier
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFIER_HOST` | No | バインドアドレス（デフォルト: 0.0.0.0） |
//! | `NOTIFIER_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | ユーザーストアの接続 URL |
//! | `NOTIFICATION_BACKEND` | No | `smtp` または `noop`（デフォルト: noop） |
//! | `NOTIFICATION_ENABLED` | No | `false` で送信を無効化（デフォルト: true） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP サーバー（デフォルト: localhost:1025） |
//! | `SMTP_USERNAME` / `SMTP_PASSWORD` | No | SMTP 認証情報（両方設定した場合のみ認証） |
//! | `SMTP_ENCRYPTION` | No | `none` / `starttls` / `tls`（デフォルト: none） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: info,pubnotify=debug） |
//! | `LOG_FORMAT` | No | `json` または `pretty` |

use std::sync::Arc;

use anyhow::Context as _;
use pubnotify_infra::{
    db,
    notification::{NoopNotificationSender, NotificationSender, SmtpNotificationSender},
    repository::PostgresUserRepository,
};
use pubnotify_notifier::{
    app_builder::{bind_listener, build_app},
    config::{NotificationBackend, NotificationConfig, NotifierConfig},
    usecase::{NotificationService, RecipientResolver, TemplateRenderer},
};
use pubnotify_shared::observability::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("notifier");
    init_tracing(&tracing_config);
    let _tracing_guard = tracing_config.root_span().entered();

    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Notifier サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let sender = build_sender(&config.notification)?;
    let service = NotificationService::new(
        Arc::new(PostgresUserRepository::new(pool)),
        sender,
        TemplateRenderer::new().context("通知テンプレートの読み込みに失敗しました")?,
        RecipientResolver::new(config.notification.manager_roles.clone()),
    );

    let app = build_app(Arc::new(service));

    let listener = bind_listener(&config.host, config.port)
        .await
        .with_context(|| format!("{}:{} にバインドできません", config.host, config.port))?;
    tracing::info!(
        "Notifier サーバーが起動しました: {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// 設定に応じた送信バックエンドを構築する
fn build_sender(config: &NotificationConfig) -> anyhow::Result<Arc<dyn NotificationSender>> {
    match config.effective_backend() {
        NotificationBackend::Smtp => {
            let sender = SmtpNotificationSender::new(
                &config.smtp,
                &config.from_address,
                config.from_name.as_deref(),
            )
            .context("SMTP 送信の初期化に失敗しました")?;
            tracing::info!(
                smtp_host = %config.smtp.host,
                smtp_port = config.smtp.port,
                use_tls = config.smtp.encryption.use_tls(),
                authenticated = config.smtp.credentials.is_some(),
                "通知バックエンド: SMTP"
            );
            Ok(Arc::new(sender))
        }
        NotificationBackend::Noop => {
            tracing::info!(enabled = config.enabled, "通知バックエンド: Noop（送信しない）");
            Ok(Arc::new(NoopNotificationSender))
        }
    }
}
