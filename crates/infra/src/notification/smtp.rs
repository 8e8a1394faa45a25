//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー、暗号化なし）に接続する。

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use pubnotify_domain::notification::{EmailMessage, NotificationError, Recipient};

use super::NotificationSender;
use crate::error::InfraError;

/// SMTP セッション全体のタイムアウト
///
/// 公開操作の経路上で送信するため、応答しないサーバーで長時間待たない。
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// SMTP 接続の暗号化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpEncryption {
    /// 暗号化なし（Mailpit 等のローカル SMTP 向け）
    #[default]
    None,
    /// 平文接続後に STARTTLS で昇格する（必須）
    StartTls,
    /// 接続時から TLS（SMTPS）
    Tls,
}

impl SmtpEncryption {
    /// TLS を使用するか
    pub fn use_tls(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for SmtpEncryption {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            other => Err(InfraError::configuration(format!(
                "不正な SMTP 暗号化方式: {other}（none | starttls | tls）"
            ))),
        }
    }
}

/// SMTP 認証情報
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// SMTP 接続設定
///
/// 起動時に 1 度だけ構築され、送信のたびに変化することはない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// SMTP サーバーのホスト名（例: "localhost"）
    pub host:        String,
    /// SMTP サーバーのポート番号（例: 1025 for Mailpit）
    pub port:        u16,
    /// 認証情報（未設定なら認証しない）
    pub credentials: Option<SmtpCredentials>,
    /// 暗号化方式
    pub encryption:  SmtpEncryption,
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from:      Mailbox,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `config`: SMTP 接続設定
    /// - `from_address`: 送信元メールアドレス
    /// - `from_name`: 送信元の表示名
    ///
    /// # エラー
    ///
    /// 送信元アドレスが不正、または TLS 設定の構築に失敗した場合は
    /// `InfraErrorKind::Configuration` を返す。
    pub fn new(
        config: &SmtpConfig,
        from_address: &str,
        from_name: Option<&str>,
    ) -> Result<Self, InfraError> {
        let address: Address = from_address.parse().map_err(|e| {
            InfraError::configuration(format!("送信元アドレス不正: {from_address}: {e}"))
        })?;
        let from = Mailbox::new(from_name.map(str::to_string), address);

        let builder = match config.encryption {
            // builder_dangerous: TLS なしで接続
            SmtpEncryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
            SmtpEncryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(
                    |e| InfraError::configuration(format!("STARTTLS 設定に失敗: {e}")),
                )?
            }
            SmtpEncryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| InfraError::configuration(format!("TLS 設定に失敗: {e}")))?,
        };

        let mut builder = builder.port(config.port).timeout(Some(SMTP_TIMEOUT));
        if let Some(credentials) = &config.credentials {
            builder = builder.credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// 送信する MIME メッセージを組み立てる
    ///
    /// 全宛先を `To` ヘッダーに並べた multipart/alternative（テキスト + HTML）を返す。
    fn build_message(&self, email: &EmailMessage) -> Result<Message, NotificationError> {
        if email.to.is_empty() {
            return Err(NotificationError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(&email.subject);
        for recipient in &email.to {
            builder = builder.to(to_mailbox(recipient)?);
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
    }
}

/// 宛先を lettre の Mailbox に変換する
fn to_mailbox(recipient: &Recipient) -> Result<Mailbox, NotificationError> {
    let address: Address = recipient
        .email()
        .as_str()
        .parse()
        .map_err(|e| NotificationError::SendFailed(format!("宛先アドレス不正: {e}")))?;

    Ok(Mailbox::new(recipient.name().map(str::to_string), address))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}
