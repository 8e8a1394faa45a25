//! # UserRepository
//!
//! 投稿者・サイト管理者の情報をプラットフォームのユーザーストアから取得するリポジトリ。
//!
//! ## 想定スキーマ
//!
//! ユーザーストアはプラットフォームが管理する。このリポジトリは次の列を読み取る:
//!
//! ```sql
//! CREATE TABLE users (
//!     id           BIGINT PRIMARY KEY,
//!     display_name TEXT NOT NULL,
//!     email        TEXT NOT NULL,
//!     role         TEXT NOT NULL
//! );
//! ```
//!
//! ## 設計方針
//!
//! - **実行時検証のクエリ**: スキーマはこのリポジトリの管理外のため、
//!   `query!` マクロのコンパイル時検証ではなく `query_as` を使う
//! - **未知のロール**: プラットフォーム独自のロールは [`Role::Other`] として読み込む
//! - **未検証のメールアドレス**: 構文検証は宛先を組み立てる側で行う

use async_trait::async_trait;
use pubnotify_domain::{
    role::{ManagerRoles, Role},
    user::{User, UserId},
};
use sqlx::{FromRow, PgPool};

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
///
/// 公開通知に必要なユーザー情報の取得操作を定義する。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ID でユーザーを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError>;

    /// 指定したロールのいずれかを持つユーザーを ID 順に取得
    async fn find_by_roles(&self, roles: &ManagerRoles) -> Result<Vec<User>, InfraError>;
}

/// ユーザーストアの行
#[derive(Debug, FromRow)]
struct UserRow {
    id:           i64,
    display_name: String,
    email:        String,
    role:         String,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|_| InfraError::invalid_data(format!("不正なユーザー ID: {}", row.id)))?;

        Ok(User::new(
            UserId::from_raw(id),
            row.display_name,
            row.email,
            Role::from_platform(&row.role),
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError> {
        let raw_id = i64::try_from(id.as_u64())
            .map_err(|_| InfraError::invalid_data(format!("ユーザー ID が範囲外です: {id}")))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, email, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(raw_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(roles = %roles))]
    async fn find_by_roles(&self, roles: &ManagerRoles) -> Result<Vec<User>, InfraError> {
        let role_names: Vec<String> = roles.names().into_iter().map(str::to_string).collect();

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, email, role
            FROM users
            WHERE role = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(role_names)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_row(id: i64, role: &str) -> UserRow {
        UserRow {
            id,
            display_name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_行からユーザーに変換できる() {
        let user = User::try_from(make_row(7, "editor")).unwrap();

        assert_eq!(
            user,
            User::new(UserId::from_raw(7), "Alice", "alice@x.com", Role::Editor)
        );
    }

    #[test]
    fn test_未知のロールはotherとして読み込む() {
        let user = User::try_from(make_row(7, "shop_manager")).unwrap();
        assert_eq!(user.role(), Role::Other);
    }

    #[test]
    fn test_負のidは不正データ() {
        assert!(User::try_from(make_row(-1, "editor")).is_err());
    }

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresUserRepository>();
    }
}
