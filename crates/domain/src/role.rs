//! # ロール
//!
//! プラットフォームのユーザーロールと、通知対象となるサイト管理者ロールの集合を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Role`] | ロール | プラットフォームがユーザーに割り当てる役割 |
//! | [`ManagerRoles`] | サイト管理者ロール | 公開通知を受け取るロールの集合（既定: 管理者・編集者） |
//!
//! ## 使用例
//!
//! ```rust
//! use pubnotify_domain::role::{ManagerRoles, Role};
//!
//! let roles = ManagerRoles::default();
//! assert!(roles.contains(Role::Administrator));
//! assert!(roles.contains(Role::Editor));
//! assert!(!roles.contains(Role::Subscriber));
//!
//! let custom: ManagerRoles = "administrator, author".parse().unwrap();
//! assert_eq!(custom.to_string(), "administrator,author");
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// ユーザーロール
///
/// プラットフォームのユーザーストアに格納された文字列（snake_case）と相互変換する。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// 管理者
    Administrator,
    /// 編集者
    Editor,
    /// 投稿者
    Author,
    /// 寄稿者
    Contributor,
    /// 購読者
    Subscriber,
    /// プラットフォーム独自のロール（プラグイン等が追加したもの）
    Other,
}

impl Role {
    /// ユーザーストアに格納されたロール名から変換する
    ///
    /// 既知のロール以外は [`Role::Other`] として扱う。
    /// 設定値のパースには厳密な [`FromStr`] を使うこと。
    pub fn from_platform(name: &str) -> Self {
        name.parse().unwrap_or(Self::Other)
    }

    /// サイト管理者ロールとして指定できるか判定する
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Self::Administrator),
            "editor" => Ok(Self::Editor),
            "author" => Ok(Self::Author),
            "contributor" => Ok(Self::Contributor),
            "subscriber" => Ok(Self::Subscriber),
            _ => Err(DomainError::Validation(format!("不正なロール: {s}"))),
        }
    }
}

/// サイト管理者ロールの集合
///
/// 公開通知を受け取るユーザーのロールを表す。重複なし・ロール順で保持する。
///
/// # 不変条件
///
/// - 空集合にはならない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerRoles(Vec<Role>);

impl ManagerRoles {
    /// ロールの一覧から作成する
    ///
    /// 重複と [`Role::Other`] は除去される。
    ///
    /// # エラー
    ///
    /// ロールが 1 つも指定されていない場合は `DomainError::Validation` を返す。
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Result<Self, DomainError> {
        let mut roles: Vec<Role> = roles.into_iter().filter(Role::is_assignable).collect();
        roles.sort();
        roles.dedup();

        if roles.is_empty() {
            return Err(DomainError::Validation(
                "通知対象のロールを 1 つ以上指定してください".to_string(),
            ));
        }

        Ok(Self(roles))
    }

    /// 指定したロールが含まれるか判定する
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// ロールのスライスを取得する
    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }

    /// ロール名（snake_case）の一覧を返す
    ///
    /// リポジトリのクエリパラメータに使用する。
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().copied().map(<&'static str>::from).collect()
    }
}

impl Default for ManagerRoles {
    fn default() -> Self {
        Self(vec![Role::Administrator, Role::Editor])
    }
}

impl FromStr for ManagerRoles {
    type Err = DomainError;

    /// カンマ区切りのロール名からパースする（例: `"administrator,editor"`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let roles = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Role::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(roles)
    }
}

impl fmt::Display for ManagerRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("administrator", Role::Administrator)]
    #[case("editor", Role::Editor)]
    #[case("author", Role::Author)]
    #[case("contributor", Role::Contributor)]
    #[case("subscriber", Role::Subscriber)]
    fn test_ロール名の文字列変換が往復する(#[case] name: &str, #[case] role: Role) {
        assert_eq!(Role::from_str(name).unwrap(), role);
        assert_eq!(role.to_string(), name);
    }

    #[rstest]
    #[case("Administrator")]
    #[case("admin")]
    #[case("")]
    fn test_未知のロール名はバリデーションエラー(#[case] name: &str) {
        assert!(matches!(
            Role::from_str(name),
            Err(DomainError::Validation(_))
        ));
    }

    #[rstest]
    #[case("editor", Role::Editor)]
    #[case("shop_manager", Role::Other)]
    #[case("", Role::Other)]
    fn test_ユーザーストアのロール名は未知の値をotherにする(
        #[case] name: &str,
        #[case] expected: Role,
    ) {
        assert_eq!(Role::from_platform(name), expected);
    }

    #[test]
    fn test_otherは文字列からパースできない() {
        assert_eq!(Role::Other.to_string(), "other");
        assert!(Role::from_str("other").is_err());
    }

    #[test]
    fn test_既定の管理者ロールは管理者と編集者() {
        let roles = ManagerRoles::default();

        assert_eq!(roles.as_slice(), &[Role::Administrator, Role::Editor]);
        assert_eq!(roles.names(), vec!["administrator", "editor"]);
    }

    #[test]
    fn test_カンマ区切りのパースで空白と重複を無視する() {
        let roles: ManagerRoles = " editor , administrator,editor,".parse().unwrap();

        assert_eq!(roles.as_slice(), &[Role::Administrator, Role::Editor]);
    }

    #[rstest]
    #[case("")]
    #[case(" , ")]
    fn test_空のロール指定はエラー(#[case] input: &str) {
        assert!(input.parse::<ManagerRoles>().is_err());
    }

    #[test]
    fn test_未知のロールを含む指定はエラー() {
        assert!("administrator,owner".parse::<ManagerRoles>().is_err());
    }
}
