//! # 通知
//!
//! 投稿公開時のメール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Recipient`] | 宛先 | 表示名付きの検証済みメールアドレス |
//! | [`RecipientList`] | 宛先リスト | 重複のない順序付き宛先集合。通知 1 件ごとに作られ、送信後に破棄される |
//! | [`PostPublishedNotification`] | 公開通知 | 投稿者名・タイトル・URL と宛先リストの組 |
//! | [`EmailMessage`] | メールメッセージ | テンプレートレンダリングの出力 |
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: 通知送信の失敗は公開操作に影響しない
//! - **宛先の不変条件を型で保証**: [`RecipientList`] は [`Email`] しか受け付けず、
//!   追加時に大文字小文字を区別せず重複を除去する
//! - **テンプレート分離**: 通知データとメール生成は分離（TemplateRenderer は notifier アプリ）

use std::fmt;

use thiserror::Error;

use crate::{post::PostId, user::Email};

define_uuid_id! {
    /// 通知 ID（一意識別子）
    ///
    /// 1 件の公開通知に関するログを相関させるために使用する。UUID v7 を使用。
    pub struct NotificationId;
}

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// 宛先が 1 件もない
    #[error("宛先がありません")]
    NoRecipients,
}

/// 宛先
///
/// 表示名があれば `表示名 <アドレス>` 形式で表示する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    name:  Option<String>,
    email: Email,
}

impl Recipient {
    /// 宛先を作成する
    ///
    /// 空白のみの表示名は表示名なしとして扱う。
    pub fn new(name: Option<String>, email: Email) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self { name, email }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> &Email {
        &self.email
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

/// 宛先リスト
///
/// # 不変条件
///
/// - 同じアドレス（大文字小文字を区別しない）は 1 度しか含まれない
/// - 構文検証済みのアドレスのみ含まれる（[`Email`] 型で保証）
/// - 追加順を保持する（先に追加された宛先の表示名が残る）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList(Vec<Recipient>);

impl RecipientList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 宛先を追加する
    ///
    /// 同じアドレスが既に含まれている場合は追加せず `false` を返す。
    pub fn push(&mut self, recipient: Recipient) -> bool {
        if self.contains(recipient.email()) {
            return false;
        }
        self.0.push(recipient);
        true
    }

    /// アドレスが含まれているか判定する（大文字小文字を区別しない）
    pub fn contains(&self, email: &Email) -> bool {
        self.0.iter().any(|r| r.email().is_same_address(email))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipient> {
        self.0.iter()
    }

    /// アドレス文字列の一覧を返す
    pub fn addresses(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.email().as_str()).collect()
    }
}

impl FromIterator<Recipient> for RecipientList {
    fn from_iter<I: IntoIterator<Item = Recipient>>(iter: I) -> Self {
        let mut list = Self::new();
        for recipient in iter {
            list.push(recipient);
        }
        list
    }
}

impl<'a> IntoIterator for &'a RecipientList {
    type Item = &'a Recipient;
    type IntoIter = std::slice::Iter<'a, Recipient>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
/// 宛先全員に 1 通のメールとして送信される。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信先
    pub to:        RecipientList,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// 投稿公開通知
///
/// 投稿者と宛先の解決が済んだ、レンダリング直前の通知内容。
#[derive(Debug, Clone)]
pub struct PostPublishedNotification {
    pub id:          NotificationId,
    pub post_id:     PostId,
    pub post_title:  String,
    pub permalink:   String,
    pub author_name: String,
    pub recipients:  RecipientList,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn recipient(name: Option<&str>, email: &str) -> Recipient {
        Recipient::new(name.map(str::to_string), Email::new(email).unwrap())
    }

    #[test]
    fn test_宛先の表示形式() {
        assert_eq!(
            recipient(Some("Alice"), "alice@x.com").to_string(),
            "Alice <alice@x.com>"
        );
        assert_eq!(recipient(None, "bob@x.com").to_string(), "bob@x.com");
        assert_eq!(recipient(Some("  "), "bob@x.com").name(), None);
    }

    #[test]
    fn test_宛先リストは同じアドレスを一度だけ保持する() {
        let mut list = RecipientList::new();

        assert!(list.push(recipient(Some("Alice"), "alice@x.com")));
        assert!(list.push(recipient(Some("Bob"), "bob@x.com")));
        assert!(!list.push(recipient(Some("Admin"), "ALICE@x.com")));

        assert_eq!(list.len(), 2);
        assert_eq!(list.addresses(), vec!["alice@x.com", "bob@x.com"]);
        // 先に追加された宛先の表示名が残る
        assert_eq!(list.iter().next().unwrap().name(), Some("Alice"));
    }

    #[test]
    fn test_イテレータからの構築でも重複を除去する() {
        let list: RecipientList = vec![
            recipient(None, "carol@x.com"),
            recipient(None, "dave@x.com"),
            recipient(None, "carol@x.com"),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.addresses(), vec!["carol@x.com", "dave@x.com"]);
    }

    #[test]
    fn test_空の宛先リスト() {
        let list = RecipientList::default();

        assert!(list.is_empty());
        assert!(!list.contains(&Email::new("alice@x.com").unwrap()));
    }
}
