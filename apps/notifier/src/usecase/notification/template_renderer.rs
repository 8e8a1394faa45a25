//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで公開通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名パターン**: `Post published: {title}`
//! - **自動エスケープ**: `.html` テンプレートのみ HTML エスケープされ、`.txt` はそのまま出力される

use pubnotify_domain::notification::{EmailMessage, NotificationError, PostPublishedNotification};
use tera::{Context, Tera};

const POST_PUBLISHED: &str = "post_published";

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`PostPublishedNotification` から
/// `EmailMessage` を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "post_published.html",
                    include_str!("../../../templates/notifications/post_published.html"),
                ),
                (
                    "post_published.txt",
                    include_str!("../../../templates/notifications/post_published.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 公開通知からメールメッセージを生成する
    ///
    /// 宛先は `notification.recipients` をそのまま使う。
    pub fn render(
        &self,
        notification: &PostPublishedNotification,
    ) -> Result<EmailMessage, NotificationError> {
        let mut context = Context::new();
        context.insert("author_name", &notification.author_name);
        context.insert("post_title", &notification.post_title);
        context.insert("permalink", &notification.permalink);

        let html_body = self
            .engine
            .render(&format!("{POST_PUBLISHED}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{POST_PUBLISHED}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            to: notification.recipients.clone(),
            subject: subject_for(&notification.post_title),
            html_body,
            text_body,
        })
    }
}

/// 件名を組み立てる
///
/// 改行を含むタイトルはヘッダーを壊さないよう空白に置き換える。
fn subject_for(post_title: &str) -> String {
    let title = post_title
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("Post published: {title}")
}
