//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・Mailpit 開発用）、Noop（通知無効化・テスト用）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択

mod noop;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
use pubnotify_domain::notification::{EmailMessage, NotificationError};
pub use smtp::{SmtpConfig, SmtpCredentials, SmtpEncryption, SmtpNotificationSender};

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
/// 送信は 1 回きりで、リトライや配送確認は行わない。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    ///
    /// `email.to` の全宛先に 1 通のメールとして送信する。
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
