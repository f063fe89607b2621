//! Notification Service
//!
//! The delivery gateway: "deliver to one user". Each notification is persisted
//! as an inbox row and then mirrored to the recipient's device on a
//! background task. Persistence failures reach the caller; push failures
//! never do.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::domain::{
    NewNotification, Notification, NotificationKind, NotificationRepository, PushData,
    PushMessage, PushTarget, UserRepository,
};
use crate::infrastructure::metrics;
use crate::infrastructure::push::{PushClient, PushOutcome};
use crate::shared::error::AppError;

/// Notification service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Persist a notification for `recipient_id` and attempt a push.
    ///
    /// Succeeds as soon as the row is stored, whatever happens to the push.
    async fn notify(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        title: &str,
        body: &str,
    ) -> Result<NotificationDto, NotificationError>;

    /// Same as [`notify`](Self::notify) with a deep-link data map on the push.
    async fn notify_with_data(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        title: &str,
        body: &str,
        data: PushData,
    ) -> Result<NotificationDto, NotificationError>;

    /// Inbox of `recipient_id`, newest first.
    async fn list_notifications(
        &self,
        recipient_id: i64,
    ) -> Result<Vec<NotificationDto>, NotificationError>;

    /// Mark one notification read on behalf of `user_id`.
    async fn mark_as_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<NotificationDto, NotificationError>;

    /// Store the device token pushes for `user_id` are sent to.
    async fn update_push_target(&self, user_id: i64, token: &str) -> Result<(), NotificationError>;
}

/// Notification data transfer object
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDto {
    pub id: i64,
    pub recipient_id: i64,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            recipient_id: n.recipient_id,
            kind: n.kind.as_str().to_string(),
            title: n.title,
            body: n.body,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Notification belongs to another user")]
    Forbidden,

    #[error("Push token must not be empty")]
    InvalidPushToken,

    #[error("Failed to persist notification: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// What happened to the push side of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDelivery {
    /// Accepted by the provider
    Sent,
    /// Provider not configured; logged no-op
    Stubbed,
    /// Recipient has no push target
    Skipped,
    /// Lookup or provider error
    Failed,
    /// Send exceeded the push timeout
    TimedOut,
}

impl PushDelivery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Stubbed => "stubbed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::TimedOut => "timeout",
        }
    }
}

/// NotificationService implementation
pub struct NotificationServiceImpl<N, U>
where
    N: NotificationRepository,
    U: UserRepository,
{
    notification_repo: Arc<N>,
    user_repo: Arc<U>,
    push: Arc<dyn PushClient>,
    push_timeout: Duration,
}

impl<N, U> NotificationServiceImpl<N, U>
where
    N: NotificationRepository,
    U: UserRepository + 'static,
{
    pub fn new(
        notification_repo: Arc<N>,
        user_repo: Arc<U>,
        push: Arc<dyn PushClient>,
        push_timeout: Duration,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            push,
            push_timeout,
        }
    }

    /// Start the push for a stored notification without waiting for it.
    pub fn spawn_push(
        &self,
        recipient_id: i64,
        title: String,
        body: String,
        data: PushData,
    ) -> JoinHandle<PushDelivery> {
        let user_repo = self.user_repo.clone();
        let push = self.push.clone();
        let timeout = self.push_timeout;

        tokio::spawn(async move {
            let outcome = deliver_push(
                user_repo.as_ref(),
                push.as_ref(),
                recipient_id,
                title,
                body,
                data,
                timeout,
            )
            .await;
            metrics::record_push_send(outcome.as_str());
            outcome
        })
    }
}

/// One push attempt for `recipient_id`, bounded by `timeout`. Never fails;
/// every outcome is logged with its own `outcome` label.
pub async fn deliver_push<U>(
    user_repo: &U,
    push: &dyn PushClient,
    recipient_id: i64,
    title: String,
    body: String,
    data: PushData,
    timeout: Duration,
) -> PushDelivery
where
    U: UserRepository + ?Sized,
{
    let target = match user_repo.find_by_id(recipient_id).await {
        Ok(Some(user)) => user.push_target(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(recipient_id, error = %e, outcome = "failed", "Push target lookup failed");
            return PushDelivery::Failed;
        }
    };

    let Some(target) = target else {
        tracing::debug!(recipient_id, outcome = "skipped", "No push target, push skipped");
        return PushDelivery::Skipped;
    };

    let message = PushMessage::new(target, title, body).with_data(data);
    let provider = push.provider();

    match tokio::time::timeout(timeout, push.send(&message)).await {
        Ok(Ok(PushOutcome::Sent { message_id })) => {
            tracing::info!(recipient_id, provider, %message_id, outcome = "sent", "Push sent");
            PushDelivery::Sent
        }
        Ok(Ok(PushOutcome::Stubbed)) => {
            tracing::info!(
                recipient_id,
                provider,
                title = %message.title,
                outcome = "stubbed",
                "Push provider not configured, push stubbed"
            );
            PushDelivery::Stubbed
        }
        Ok(Err(e)) => {
            tracing::warn!(recipient_id, provider, error = %e, outcome = "failed", "Push send failed");
            PushDelivery::Failed
        }
        Err(_) => {
            tracing::warn!(
                recipient_id,
                provider,
                timeout_ms = timeout.as_millis() as u64,
                outcome = "timeout",
                "Push send timed out"
            );
            PushDelivery::TimedOut
        }
    }
}

#[async_trait]
impl<N, U> NotificationService for NotificationServiceImpl<N, U>
where
    N: NotificationRepository + 'static,
    U: UserRepository + 'static,
{
    async fn notify(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        title: &str,
        body: &str,
    ) -> Result<NotificationDto, NotificationError> {
        let mut data = PushData::new();
        data.insert("type".to_string(), kind.as_str().to_string());
        self.notify_with_data(recipient_id, kind, title, body, data)
            .await
    }

    async fn notify_with_data(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        title: &str,
        body: &str,
        data: PushData,
    ) -> Result<NotificationDto, NotificationError> {
        let new = NewNotification {
            recipient_id,
            kind,
            title: title.to_string(),
            body: body.to_string(),
        };

        let notification = self.notification_repo.create(&new).await.map_err(|e| {
            tracing::error!(recipient_id, kind = %new.kind, error = %e, "Failed to persist notification");
            NotificationError::Persistence(e.to_string())
        })?;

        metrics::record_notification_created(notification.kind.as_str());
        tracing::debug!(
            notification_id = notification.id,
            recipient_id,
            kind = %notification.kind,
            "Notification stored"
        );

        self.spawn_push(recipient_id, new.title, new.body, data);

        Ok(notification.into())
    }

    async fn list_notifications(
        &self,
        recipient_id: i64,
    ) -> Result<Vec<NotificationDto>, NotificationError> {
        let notifications = self
            .notification_repo
            .find_by_recipient(recipient_id)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))?;

        Ok(notifications.into_iter().map(NotificationDto::from).collect())
    }

    async fn mark_as_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<NotificationDto, NotificationError> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))?
            .ok_or(NotificationError::NotFound)?;

        if !notification.belongs_to(user_id) {
            return Err(NotificationError::Forbidden);
        }

        if notification.is_read {
            return Ok(notification.into());
        }

        let updated = self
            .notification_repo
            .mark_read(notification_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => NotificationError::NotFound,
                other => NotificationError::Internal(other.to_string()),
            })?;

        Ok(updated.into())
    }

    async fn update_push_target(&self, user_id: i64, token: &str) -> Result<(), NotificationError> {
        let target = PushTarget::new(token).map_err(|_| NotificationError::InvalidPushToken)?;

        self.user_repo
            .update_push_token(user_id, target.token())
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => NotificationError::UserNotFound,
                other => NotificationError::Internal(other.to_string()),
            })?;

        tracing::info!(user_id, "Push token updated");
        Ok(())
    }
}
