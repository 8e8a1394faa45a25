//! # Pubnotify ドメイン層
//!
//! 投稿公開通知の中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: メールアドレスは構文検証済みの [`user::Email`] としてのみ宛先になれる
//! - **読み取り専用エンティティ**: 投稿・ユーザーはプラットフォームが所有し、変更しない
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//!     ↘                ↑
//!       ────────────────
//! ```
//!
//! ドメイン層はインフラ層（DB、SMTP）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`notification`] - 宛先リスト・通知メッセージ
//! - [`post`] - 投稿と公開イベント
//! - [`role`] - ロールとサイト管理者ロールの集合
//! - [`user`] - ユーザーとメールアドレス

#[macro_use]
mod macros;

pub mod error;
pub mod notification;
pub mod post;
pub mod role;
pub mod user;

pub use error::DomainError;
