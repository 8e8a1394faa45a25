//! # リポジトリ実装
//!
//! プラットフォームが所有するデータへの読み取りアクセスを提供する。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: このシステムはユーザーストアに書き込まない
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod user_repository;

pub use user_repository::{PostgresUserRepository, UserRepository};
