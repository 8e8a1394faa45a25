//! # 投稿
//!
//! 公開通知の入力となる投稿と、プラットフォームから届く公開イベントを定義する。
//!
//! 投稿はプラットフォームが所有する読み取り専用データであり、
//! このシステムは公開イベントとして受け取った内容をそのまま使う。

use serde::{Deserialize, Serialize};

use crate::{DomainError, user::UserId};

define_platform_id! {
    /// 投稿 ID（プラットフォーム採番）
    pub struct PostId;
}

/// 投稿
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// 投稿 ID
    pub id:        PostId,
    /// タイトル
    pub title:     String,
    /// 投稿者のユーザー ID
    pub author_id: UserId,
    /// 公開 URL
    pub permalink: String,
}

/// 投稿公開イベント
///
/// 投稿が公開状態に遷移したときにプラットフォームから通知される。
/// `post_id` と `post.id` は一致していなければならない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPublished {
    pub post_id: PostId,
    pub post:    Post,
}

impl PostPublished {
    pub fn new(post: Post) -> Self {
        Self {
            post_id: post.id,
            post,
        }
    }

    /// イベントの整合性を検証する
    ///
    /// # エラー
    ///
    /// `post_id` と `post.id` が食い違う場合は `DomainError::Validation` を返す。
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.post_id != self.post.id {
            return Err(DomainError::Validation(format!(
                "イベントの投稿 ID が一致しません: post_id={}, post.id={}",
                self.post_id, self.post.id
            )));
        }
        Ok(())
    }
}
