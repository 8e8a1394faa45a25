//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリのリポジトリ・送信実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! pubnotify-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pubnotify_domain::{
    notification::{EmailMessage, NotificationError},
    role::ManagerRoles,
    user::{User, UserId},
};

use crate::{error::InfraError, notification::NotificationSender, repository::UserRepository};

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users:       Arc<Mutex<Vec<User>>>,
    unavailable: bool,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全クエリがエラーを返すリポジトリ（ユーザーストア障害の再現用）
    pub fn unavailable() -> Self {
        Self {
            users:       Arc::new(Mutex::new(Vec::new())),
            unavailable: true,
        }
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let repo = Self::new();
        for user in users {
            repo.add_user(user);
        }
        repo
    }

    fn check_available(&self) -> Result<(), InfraError> {
        if self.unavailable {
            return Err(InfraError::unexpected("ユーザーストアに接続できません"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn find_by_roles(&self, roles: &ManagerRoles) -> Result<Vec<User>, InfraError> {
        self.check_available()?;
        let mut users: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| roles.contains(u.role()))
            .cloned()
            .collect();
        users.sort_by_key(User::id);
        Ok(users)
    }
}

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `failing()` で作成すると、記録した上で常に送信失敗を返す。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:    Arc<Mutex<Vec<EmailMessage>>>,
    failing: bool,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent:    Arc::new(Mutex::new(Vec::new())),
            failing: true,
        }
    }

    /// 送信が試みられたメールの一覧
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.failing {
            return Err(NotificationError::SendFailed(
                "SMTP 送信失敗: connection refused".to_string(),
            ));
        }
        Ok(())
    }
}
