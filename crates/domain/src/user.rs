//! # ユーザー
//!
//! 投稿者・サイト管理者を表すユーザーエンティティと、メールアドレス値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`User`] | ユーザー | プラットフォームのユーザーストアが所有する読み取り専用レコード |
//! | [`Email`] | メールアドレス | 構文検証済みのアドレス。通知の宛先になれるのはこの型のみ |
//!
//! ## 設計方針
//!
//! - **読み取り専用**: ユーザーはプラットフォームが所有し、このシステムは変更しない
//! - **生のアドレスを保持**: ユーザーストアには不正なアドレスも格納されうるため、
//!   `User` は文字列のまま保持し、宛先に使う時点で [`Email`] に変換する
//!
//! ## 使用例
//!
//! ```rust
//! use pubnotify_domain::{
//!     role::Role,
//!     user::{User, UserId},
//! };
//!
//! let user = User::new(
//!     UserId::from_raw(7),
//!     "Alice",
//!     "alice@example.com",
//!     Role::Editor,
//! );
//! assert_eq!(user.valid_email().unwrap().as_str(), "alice@example.com");
//!
//! let broken = User::new(UserId::from_raw(8), "Bob", "bob@", Role::Editor);
//! assert!(broken.valid_email().is_none());
//! ```

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::{DomainError, role::Role};

define_platform_id! {
    /// ユーザー ID（プラットフォーム採番）
    pub struct UserId;
}

/// メールアドレスの最大長（RFC 5321 のパス長制限）
const EMAIL_MAX_LENGTH: usize = 254;

/// メールアドレス（値オブジェクト）
///
/// 生成時に構文検証を行い、不正な値の作成を防ぐ。
/// 実在性（配送可能か）は検証しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// 前後の空白は除去される。
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 最大 254 文字
    /// - `local@domain` の構文（HTML5 仕様準拠）を満たす
    /// - ローカル部に空の atom（先頭・末尾・連続したドット）や引用符がない
    /// - ドメイン部が 2 ラベル以上のホスト名である（ドメインリテラル不可）
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        if value.len() > EMAIL_MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "メールアドレスは{EMAIL_MAX_LENGTH}文字以内である必要があります"
            )));
        }

        if !value.validate_email() {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        }

        check_dot_atoms(&value)?;

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 大文字小文字を区別せずに同じアドレスか判定する
    pub fn is_same_address(&self, other: &Email) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

/// ローカル部・ドメイン部がともにドット区切りの atom であることを検査する
///
/// validator は空の atom（`a..b@x.com`、`.a@x.com`）、引用符付きローカル部、
/// ドメインリテラル（`a@[127.0.0.1]`）、単一ラベルのドメイン（`a@localhost`）を
/// 許容するが、送信時のアドレス解析ではいずれも宛先にできない。
fn check_dot_atoms(value: &str) -> Result<(), DomainError> {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return Err(DomainError::Validation(format!(
            "メールアドレスの形式が不正です: {value}"
        )));
    };

    if local.starts_with('"') || local.split('.').any(str::is_empty) {
        return Err(DomainError::Validation(format!(
            "メールアドレスのローカル部が不正です: {value}"
        )));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let is_dotted_hostname = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        });
    if !is_dotted_hostname {
        return Err(DomainError::Validation(format!(
            "メールアドレスのドメインが不正です: {value}"
        )));
    }

    Ok(())
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーエンティティ
///
/// プラットフォームのユーザーストアから読み込んだ投稿者・管理者の情報。
///
/// # 不変条件
///
/// - このシステムはユーザーを作成・変更・削除しない
/// - `email` は未検証の文字列であり、宛先に使う場合は [`User::valid_email`] を経由する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:           UserId,
    display_name: String,
    email:        String,
    role:         Role,
}

impl User {
    /// ユーザーを作成する（ユーザーストアからの復元用）
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: email.into(),
            role,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// ユーザーストアに格納された未検証のメールアドレス
    pub fn raw_email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// 構文検証を通過した場合のみメールアドレスを返す
    pub fn valid_email(&self) -> Option<Email> {
        Email::new(self.email.as_str()).ok()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // Email のテスト

    #[rstest]
    #[case("alice@x.com")]
    #[case("bob.smith+news@mail.example.co.jp")]
    #[case("o'reilly@example.org")]
    fn test_メールアドレスは正常な形式を受け入れる(#[case] input: &str) {
        assert!(Email::new(input).is_ok());
    }

    #[rstest]
    #[case("", "空文字列")]
    #[case("   ", "空白のみ")]
    #[case("alice", "@ なし")]
    #[case("@example.com", "ローカル部なし")]
    #[case("alice@", "ドメイン部なし")]
    #[case("alice@localhost", "単一ラベルのドメイン")]
    #[case("alice@@example.com", "@ が 2 つ")]
    #[case("alice smith@example.com", "空白を含む")]
    #[case("alice@exa mple.com", "ドメインに空白を含む")]
    #[case("a..b@x.com", "ローカル部に連続したドット")]
    #[case(".a@x.com", "ローカル部が先頭ドット")]
    #[case("a.@x.com", "ローカル部が末尾ドット")]
    #[case("\"a b\"@x.com", "引用符付きローカル部")]
    #[case("a@[127.0.0.1]", "ドメインリテラル")]
    #[case("a@x..com", "ドメインに空のラベル")]
    #[case("a@x.com.", "ドメインが末尾ドット")]
    fn test_メールアドレスは不正な形式を拒否する(#[case] input: &str, #[case] reason: &str) {
        assert!(
            matches!(Email::new(input), Err(DomainError::Validation(_))),
            "{reason} のアドレスは拒否されること: {input:?}"
        );
    }

    #[test]
    fn test_メールアドレスは長すぎる値を拒否する() {
        let local = "a".repeat(64);
        let domain = format!("{}.com", "b".repeat(EMAIL_MAX_LENGTH));
        assert!(Email::new(format!("{local}@{domain}")).is_err());
    }

    #[test]
    fn test_メールアドレスは前後の空白を除去する() {
        let email = Email::new("  alice@x.com \n").unwrap();
        assert_eq!(email.as_str(), "alice@x.com");
    }

    #[test]
    fn test_同一アドレス判定は大文字小文字を区別しない() {
        let a = Email::new("Alice@X.com").unwrap();
        let b = Email::new("alice@x.com").unwrap();

        assert!(a.is_same_address(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_メールアドレスのデシリアライズで検証される() {
        let ok: Result<Email, _> = serde_json::from_str("\"alice@x.com\"");
        let ng: Result<Email, _> = serde_json::from_str("\"not-an-address\"");

        assert_eq!(ok.unwrap().as_str(), "alice@x.com");
        assert!(ng.is_err());
    }

    // User のテスト

    #[test]
    fn test_ユーザーは正しいアドレスを検証済みで返す() {
        let user = User::new(UserId::from_raw(1), "Alice", "alice@x.com", Role::Editor);

        assert_eq!(user.id(), UserId::from_raw(1));
        assert_eq!(user.display_name(), "Alice");
        assert_eq!(user.role(), Role::Editor);
        assert_eq!(user.valid_email().unwrap().as_str(), "alice@x.com");
    }

    #[test]
    fn test_ユーザーは不正なアドレスを返さない() {
        let user = User::new(UserId::from_raw(2), "Bob", "bob at x.com", Role::Administrator);

        assert_eq!(user.raw_email(), "bob at x.com");
        assert!(user.valid_email().is_none());
    }
}
