//! # Notifier ライブラリ
//!
//! 投稿公開通知のユースケースとハンドラを公開する。
//! 結合テストからルーターを組み立てられるよう、`main.rs` から分離している。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
