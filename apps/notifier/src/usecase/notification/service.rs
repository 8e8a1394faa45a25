//! # 通知サービス
//!
//! 宛先解決 → テンプレートレンダリング → メール送信を統合するサービス。
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: `notify()` はどのステップで失敗してもエラーを返さない
//! - **ビジネスイベント**: 送信・失敗・スキップのいずれかを必ず 1 件記録する
//! - **依存性注入**: `UserRepository` と `NotificationSender` は trait で抽象化

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use pubnotify_domain::{
    notification::{NotificationId, PostPublishedNotification},
    post::{Post, PostPublished},
    user::UserId,
};
use pubnotify_infra::{InfraError, notification::NotificationSender, repository::UserRepository};
use pubnotify_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use thiserror::Error;
use tracing::Instrument;

use super::{RecipientResolver, TemplateRenderer};

/// 投稿公開イベントのハンドラ
///
/// 公開操作の経路上で呼ばれる。戻り値を持たず、失敗を呼び出し元に伝えない。
#[async_trait]
pub trait PostPublishedHandler: Send + Sync {
    async fn on_post_published(&self, event: &PostPublished);
}

/// 通知処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// 送信した
    Sent,
    /// レンダリングまたは送信に失敗した
    Failed,
    /// 投稿者不在・ユーザーストア障害・宛先なしのため送信しなかった
    Skipped,
}

/// 宛先解決のエラー
///
/// 通知をスキップする理由としてログに記録され、呼び出し元には返さない。
#[derive(Debug, Error)]
enum ResolveError {
    /// 投稿者がユーザーストアに存在しない
    #[error("投稿者が見つかりません: user_id={0}")]
    AuthorNotFound(UserId),

    /// ユーザーストアの参照に失敗
    #[error("ユーザーストアの参照に失敗: {0}")]
    UserLookup(#[from] InfraError),
}

/// 通知サービス
///
/// 投稿公開に伴うメール通知の全体フローを統合する。
pub struct NotificationService {
    user_repo:         Arc<dyn UserRepository>,
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
    resolver:          RecipientResolver,
}

impl NotificationService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
        resolver: RecipientResolver,
    ) -> Self {
        Self {
            user_repo,
            sender,
            template_renderer,
            resolver,
        }
    }

    /// 公開通知を送信する（fire-and-forget）
    ///
    /// 宛先解決 → テンプレートレンダリング → メール送信を行う。
    /// いずれのステップで失敗してもエラーを返さない（ログ出力のみ）。
    pub async fn notify(&self, event: &PostPublished) -> NotificationOutcome {
        let notification_id = NotificationId::new();
        let span = tracing::info_span!(
            "post_published_notification",
            notification_id = %notification_id,
            post_id = %event.post.id
        );

        self.run(notification_id, &event.post)
            .instrument(span)
            .await
    }

    async fn run(&self, notification_id: NotificationId, post: &Post) -> NotificationOutcome {
        let notification = match self.prepare(notification_id, post).await {
            Ok(notification) => notification,
            Err(e) => {
                log_resolution_error(&e);
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SKIPPED,
                    event.entity_type = event::entity_type::POST,
                    event.entity_id = %post.id,
                    event.result = event::result::SKIPPED,
                    reason = %e,
                    "公開通知をスキップ"
                );
                return NotificationOutcome::Skipped;
            }
        };

        if notification.recipients.is_empty() {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SKIPPED,
                event.entity_type = event::entity_type::POST,
                event.entity_id = %notification.post_id,
                notification.id = %notification.id,
                event.result = event::result::SKIPPED,
                reason = "有効な宛先がありません",
                "公開通知をスキップ"
            );
            return NotificationOutcome::Skipped;
        }

        // テンプレートレンダリング
        let email = match self.template_renderer.render(&notification) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::TEMPLATE,
                    error = %e,
                    "通知テンプレートのレンダリングに失敗"
                );
                log_failed(&notification, &e);
                return NotificationOutcome::Failed;
            }
        };

        let recipients = email.to.addresses().iter().join(", ");

        // メール送信
        match self.sender.send_email(&email).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::POST,
                    event.entity_id = %notification.post_id,
                    notification.id = %notification.id,
                    event.result = event::result::SUCCESS,
                    notification.recipient_count = email.to.len(),
                    notification.recipients = %recipients,
                    notification.subject = %email.subject,
                    "公開通知メール送信成功"
                );
                NotificationOutcome::Sent
            }
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::MAIL_TRANSPORT,
                    error = %e,
                    notification.recipients = %recipients,
                    "公開通知メールの送信に失敗"
                );
                log_failed(&notification, &e);
                NotificationOutcome::Failed
            }
        }
    }

    /// 投稿者と管理者を参照し、レンダリング直前の通知内容を組み立てる
    async fn prepare(
        &self,
        notification_id: NotificationId,
        post: &Post,
    ) -> Result<PostPublishedNotification, ResolveError> {
        let author = self
            .user_repo
            .find_by_id(post.author_id)
            .await?
            .ok_or(ResolveError::AuthorNotFound(post.author_id))?;

        let managers = self
            .user_repo
            .find_by_roles(self.resolver.manager_roles())
            .await?;

        let recipients = self.resolver.resolve(&author, &managers);

        Ok(PostPublishedNotification {
            id: notification_id,
            post_id: post.id,
            post_title: post.title.clone(),
            permalink: post.permalink.clone(),
            author_name: author.display_name().to_string(),
            recipients,
        })
    }
}

#[async_trait]
impl PostPublishedHandler for NotificationService {
    async fn on_post_published(&self, event: &PostPublished) {
        self.notify(event).await;
    }
}

fn log_resolution_error(error: &ResolveError) {
    match error {
        ResolveError::AuthorNotFound(author_id) => tracing::warn!(
            error.category = log_error::category::DATA,
            error.kind = log_error::kind::AUTHOR_NOT_FOUND,
            author_id = %author_id,
            "投稿者が見つかりません"
        ),
        ResolveError::UserLookup(e) => tracing::error!(
            error.category = log_error::category::INFRASTRUCTURE,
            error.kind = log_error::kind::USER_LOOKUP,
            error = %e,
            "ユーザーストアの参照に失敗"
        ),
    }
}

fn log_failed(notification: &PostPublishedNotification, error: &dyn std::error::Error) {
    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_FAILED,
        event.entity_type = event::entity_type::POST,
        event.entity_id = %notification.post_id,
        notification.id = %notification.id,
        event.result = event::result::FAILURE,
        notification.recipient_count = notification.recipients.len(),
        error = %error,
        "公開通知メール送信失敗"
    );
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Mutex};

    use pretty_assertions::assert_eq;
    use pubnotify_domain::{
        post::PostId,
        role::Role,
        user::{User, UserId},
    };
    use pubnotify_infra::mock::{MockNotificationSender, MockUserRepository};
    use serde_json::Value;

    use super::*;

    /// JSON 形式のログ出力を記録する
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn events(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    fn make_service(
        user_repo: MockUserRepository,
        sender: MockNotificationSender,
    ) -> NotificationService {
        NotificationService::new(
            Arc::new(user_repo),
            Arc::new(sender),
            TemplateRenderer::new().unwrap(),
            RecipientResolver::default(),
        )
    }

    fn user(id: u64, name: &str, email: &str, role: Role) -> User {
        User::new(UserId::from_raw(id), name, email, role)
    }

    fn alice() -> User {
        user(7, "Alice", "alice@x.com", Role::Author)
    }

    fn bob() -> User {
        user(1, "Bob", "bob@x.com", Role::Administrator)
    }

    fn make_event(author_id: u64) -> PostPublished {
        PostPublished::new(Post {
            id:        PostId::from_raw(42),
            title:     "Hello".to_string(),
            author_id: UserId::from_raw(author_id),
            permalink: "https://blog.example.com/?p=42".to_string(),
        })
    }

    #[tokio::test]
    async fn test_投稿者と管理者に1通のメールを送る() {
        let sender = MockNotificationSender::new();
        let service = make_service(MockUserRepository::with_users([alice(), bob()]), sender.clone());

        let outcome = service.notify(&make_event(7)).await;

        assert_eq!(outcome, NotificationOutcome::Sent);
        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.addresses(), vec!["alice@x.com", "bob@x.com"]);
        assert_eq!(sent[0].subject, "Post published: Hello");
        assert!(sent[0].text_body.contains("Alice"));
        assert!(sent[0].text_body.contains("https://blog.example.com/?p=42"));
    }

    #[tokio::test]
    async fn test_送信成功のビジネスイベントに通知idと投稿idを記録する() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let service = make_service(
            MockUserRepository::with_users([alice(), bob()]),
            MockNotificationSender::new(),
        );

        service.notify(&make_event(7)).await;

        let events = logs.events();
        let sent: Vec<&Value> = events
            .iter()
            .filter(|e| e["event.action"] == "notification.sent")
            .collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["event.kind"], "business_event");
        assert_eq!(sent[0]["event.entity_id"], "42");
        assert_eq!(sent[0]["notification.recipient_count"], 2);
        assert!(
            sent[0]["notification.id"]
                .as_str()
                .is_some_and(|id| !id.is_empty())
        );
    }

    #[tokio::test]
    async fn test_投稿者が管理者でもあれば宛先は1件() {
        let sender = MockNotificationSender::new();
        let service = make_service(MockUserRepository::with_users([bob()]), sender.clone());

        let outcome = service.notify(&make_event(1)).await;

        assert_eq!(outcome, NotificationOutcome::Sent);
        assert_eq!(sender.sent_emails()[0].to.addresses(), vec!["bob@x.com"]);
    }

    #[tokio::test]
    async fn test_管理者は宛先にid順で並ぶ() {
        let sender = MockNotificationSender::new();
        let repo = MockUserRepository::with_users([
            alice(),
            user(9, "Dave", "dave@x.com", Role::Editor),
            bob(),
            user(5, "Sam", "sam@x.com", Role::Subscriber),
        ]);
        let service = make_service(repo, sender.clone());

        service.notify(&make_event(7)).await;

        assert_eq!(
            sender.sent_emails()[0].to.addresses(),
            vec!["alice@x.com", "bob@x.com", "dave@x.com"]
        );
    }

    #[tokio::test]
    async fn test_不正なアドレスの管理者を除外して送る() {
        let sender = MockNotificationSender::new();
        let repo = MockUserRepository::with_users([
            alice(),
            bob(),
            user(2, "Carol", "carol@", Role::Editor),
        ]);
        let service = make_service(repo, sender.clone());

        service.notify(&make_event(7)).await;

        assert_eq!(
            sender.sent_emails()[0].to.addresses(),
            vec!["alice@x.com", "bob@x.com"]
        );
    }

    #[tokio::test]
    async fn test_空のatomを含むアドレスの管理者がいても他の宛先には送る() {
        let sender = MockNotificationSender::new();
        let repo = MockUserRepository::with_users([
            alice(),
            user(2, "Bob", "bob@x.com", Role::Editor),
            user(3, "Carol", "carol..smith@x.com", Role::Administrator),
        ]);
        let service = make_service(repo, sender.clone());

        let outcome = service.notify(&make_event(7)).await;

        assert_eq!(outcome, NotificationOutcome::Sent);
        assert_eq!(
            sender.sent_emails()[0].to.addresses(),
            vec!["alice@x.com", "bob@x.com"]
        );
    }

    #[tokio::test]
    async fn test_投稿者が存在しなければ送信しない() {
        let sender = MockNotificationSender::new();
        let service = make_service(MockUserRepository::with_users([bob()]), sender.clone());

        let outcome = service.notify(&make_event(99)).await;

        assert_eq!(outcome, NotificationOutcome::Skipped);
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn test_ユーザーストア障害なら送信しない() {
        let sender = MockNotificationSender::new();
        let service = make_service(MockUserRepository::unavailable(), sender.clone());

        let outcome = service.notify(&make_event(7)).await;

        assert_eq!(outcome, NotificationOutcome::Skipped);
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn test_有効な宛先がなければ送信しない() {
        let sender = MockNotificationSender::new();
        let repo = MockUserRepository::with_users([user(7, "Alice", "invalid", Role::Author)]);
        let service = make_service(repo, sender.clone());

        let outcome = service.notify(&make_event(7)).await;

        assert_eq!(outcome, NotificationOutcome::Skipped);
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn test_送信失敗してもエラーを返さない() {
        let sender = MockNotificationSender::failing();
        let service = make_service(MockUserRepository::with_users([alice(), bob()]), sender.clone());

        let outcome = service.notify(&make_event(7)).await;

        assert_eq!(outcome, NotificationOutcome::Failed);
        assert_eq!(sender.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn test_ハンドラ経由でも通知を送る() {
        let sender = MockNotificationSender::new();
        let service = make_service(MockUserRepository::with_users([alice()]), sender.clone());
        let handler: &dyn PostPublishedHandler = &service;

        handler.on_post_published(&make_event(7)).await;

        assert_eq!(sender.sent_emails().len(), 1);
    }
}
