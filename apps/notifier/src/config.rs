//! # Notifier 設定
//!
//! 環境変数から Notifier サーバーと通知機能の設定を読み込む。
//!
//! 読み込みは起動時に 1 度だけ行い、以降は不変。
//! 必須項目の欠落や不正値は [`ConfigError`] として起動を中断させる。

use std::{env, str::FromStr};

use pubnotify_domain::role::ManagerRoles;
use pubnotify_infra::notification::{SmtpConfig, SmtpCredentials, SmtpEncryption};
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません（.env を確認してください）")]
    Missing(&'static str),

    /// 環境変数の値が不正
    #[error("{key} の値が不正です: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Notifier サーバーの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// ユーザーストアの接続 URL
    pub database_url: String,
    /// 通知設定
    pub notification: NotificationConfig,
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationBackend {
    /// SMTP サーバー経由で送信
    Smtp,
    /// 送信しない（ログ出力のみ）
    #[default]
    Noop,
}

impl FromStr for NotificationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "noop" => Ok(Self::Noop),
            other => Err(format!("{other}（smtp | noop）")),
        }
    }
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
///
/// `NOTIFICATION_ENABLED=false` の場合はバックエンドに関わらず送信しない。
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド
    pub backend:       NotificationBackend,
    /// 通知機能の有効・無効
    pub enabled:       bool,
    /// 送信元メールアドレス
    pub from_address:  String,
    /// 送信元の表示名
    pub from_name:     Option<String>,
    /// 公開通知を受け取るロール
    pub manager_roles: ManagerRoles,
    /// SMTP 接続設定（backend=smtp の場合に使用）
    pub smtp:          SmtpConfig,
}

impl NotificationConfig {
    /// 実際に使用する送信バックエンド
    pub fn effective_backend(&self) -> NotificationBackend {
        if self.enabled {
            self.backend
        } else {
            NotificationBackend::Noop
        }
    }
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host:         var("NOTIFIER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port:         parse_required(&var, "NOTIFIER_PORT")?,
            database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            notification: NotificationConfig::from_lookup(&var)?,
        })
    }
}

impl NotificationConfig {
    fn from_lookup<F>(var: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            backend:       parse_or(var, "NOTIFICATION_BACKEND", NotificationBackend::Noop)?,
            enabled:       parse_bool(var, "NOTIFICATION_ENABLED", true)?,
            from_address:  var("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|| "noreply@example.com".to_string()),
            from_name:     var("NOTIFICATION_FROM_NAME"),
            manager_roles: parse_or(var, "NOTIFICATION_MANAGER_ROLES", ManagerRoles::default())?,
            smtp:          smtp_from_lookup(var)?,
        })
    }
}

fn smtp_from_lookup<F>(var: &F) -> Result<SmtpConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = match (var("SMTP_USERNAME"), var("SMTP_PASSWORD")) {
        (Some(username), Some(password)) => Some(SmtpCredentials { username, password }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::invalid(
                "SMTP_PASSWORD",
                "SMTP_USERNAME と同時に設定してください",
            ));
        }
        (None, Some(_)) => {
            return Err(ConfigError::invalid(
                "SMTP_USERNAME",
                "SMTP_PASSWORD と同時に設定してください",
            ));
        }
    };

    Ok(SmtpConfig {
        host: var("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
        port: parse_or(var, "SMTP_PORT", 1025)?,
        credentials,
        encryption: parse_or(var, "SMTP_ENCRYPTION", SmtpEncryption::None)?,
    })
}

fn parse_required<F, T>(var: &F, key: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    let raw = var(key).ok_or(ConfigError::Missing(key))?;
    raw.parse().map_err(|e: T::Err| ConfigError::invalid(key, e))
}

fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::invalid(key, e)),
        None => Ok(default),
    }
}

fn parse_bool<F>(var: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::invalid(key, format!("{other}（true | false）"))),
        },
    }
}
