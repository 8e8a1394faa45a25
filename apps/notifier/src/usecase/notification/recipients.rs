//! # 宛先解決
//!
//! 投稿者とサイト管理者から公開通知の宛先リストを組み立てる。
//!
//! ## 規則
//!
//! - 投稿者を先頭に、管理者を取得順に並べる
//! - 通知対象ロールを持たない管理者候補は除外する
//! - 構文検証を通らないアドレスは除外し、警告ログを出す
//! - 同じアドレス（大文字小文字を区別しない）は 1 度だけ含める

use itertools::{Either, Itertools};
use pubnotify_domain::{
    notification::{Recipient, RecipientList},
    role::ManagerRoles,
    user::User,
};
use pubnotify_shared::event_log::error as log_error;

/// 宛先リゾルバ
#[derive(Debug, Clone, Default)]
pub struct RecipientResolver {
    manager_roles: ManagerRoles,
}

impl RecipientResolver {
    pub fn new(manager_roles: ManagerRoles) -> Self {
        Self { manager_roles }
    }

    /// 通知対象のロール
    pub fn manager_roles(&self) -> &ManagerRoles {
        &self.manager_roles
    }

    /// 投稿者と管理者から宛先リストを組み立てる
    pub fn resolve(&self, author: &User, managers: &[User]) -> RecipientList {
        let (recipients, invalid): (Vec<Recipient>, Vec<&User>) =
            std::iter::once(author)
                .chain(
                    managers
                        .iter()
                        .filter(|user| self.manager_roles.contains(user.role())),
                )
                .partition_map(|user| match user.valid_email() {
                    Some(email) => {
                        Either::Left(Recipient::new(Some(user.display_name().to_string()), email))
                    }
                    None => Either::Right(user),
                });

        for user in invalid {
            tracing::warn!(
                error.category = log_error::category::DATA,
                error.kind = log_error::kind::INVALID_ADDRESS,
                user_id = %user.id(),
                email = user.raw_email(),
                "メールアドレスが不正なため宛先から除外"
            );
        }

        recipients.into_iter().collect()
    }
}
