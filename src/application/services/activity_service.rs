//! Activity Service
//!
//! Entry point for producers after a domain mutation commits: one canonical
//! notification per [`Activity`] and global [`BroadcastEvent`]s for the flash
//! feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::notification_service::{NotificationDto, NotificationError, NotificationService};
use crate::domain::{Activity, BroadcastEvent, User, UserRepository};

/// Sink for broadcast events. Publishing never fails from the caller's side;
/// the return value only says whether the event was accepted.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: BroadcastEvent) -> bool;
}

/// Activity service trait
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// Notify `recipient_id` about something `actor_id` did.
    ///
    /// Self-directed activity is ignored and yields `Ok(None)`.
    async fn record(
        &self,
        actor_id: i64,
        recipient_id: i64,
        activity: Activity,
    ) -> Result<Option<NotificationDto>, ActivityError>;

    /// Publish a prepared event to every live flash subscriber.
    fn announce(&self, event: BroadcastEvent) -> bool;

    /// Broadcast "New Post!" for `author_id`.
    async fn announce_post(
        &self,
        author_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<bool, ActivityError>;

    /// Broadcast "New Growth!" for a new follow.
    async fn announce_follow(&self, follower_id: i64, following_id: i64)
        -> Result<bool, ActivityError>;
}

/// Activity service errors
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("User lookup failed: {0}")]
    Lookup(String),

    #[error(transparent)]
    Notify(#[from] NotificationError),
}

/// ActivityService implementation
pub struct ActivityServiceImpl<U, S, P>
where
    U: UserRepository,
    S: NotificationService + ?Sized,
    P: EventPublisher + ?Sized,
{
    user_repo: Arc<U>,
    notifications: Arc<S>,
    publisher: Arc<P>,
}

impl<U, S, P> ActivityServiceImpl<U, S, P>
where
    U: UserRepository,
    S: NotificationService + ?Sized,
    P: EventPublisher + ?Sized,
{
    pub fn new(user_repo: Arc<U>, notifications: Arc<S>, publisher: Arc<P>) -> Self {
        Self {
            user_repo,
            notifications,
            publisher,
        }
    }

    async fn find_user(&self, user_id: i64) -> Result<User, ActivityError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| ActivityError::Lookup(e.to_string()))?
            .ok_or(ActivityError::UserNotFound(user_id))
    }
}

#[async_trait]
impl<U, S, P> ActivityService for ActivityServiceImpl<U, S, P>
where
    U: UserRepository + 'static,
    S: NotificationService + ?Sized + 'static,
    P: EventPublisher + ?Sized + 'static,
{
    async fn record(
        &self,
        actor_id: i64,
        recipient_id: i64,
        activity: Activity,
    ) -> Result<Option<NotificationDto>, ActivityError> {
        if actor_id == recipient_id {
            return Ok(None);
        }

        let actor_name = if activity.is_anonymous() {
            String::new()
        } else {
            self.find_user(actor_id).await?.display_name().to_string()
        };

        let notice = activity.notice(actor_id, &actor_name);
        let dto = self
            .notifications
            .notify_with_data(recipient_id, notice.kind, &notice.title, &notice.body, notice.data)
            .await?;

        Ok(Some(dto))
    }

    fn announce(&self, event: BroadcastEvent) -> bool {
        self.publisher.publish(event)
    }

    async fn announce_post(
        &self,
        author_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<bool, ActivityError> {
        let author = self.find_user(author_id).await?;
        Ok(self.announce(BroadcastEvent::new_post(&author, created_at)))
    }

    async fn announce_follow(
        &self,
        follower_id: i64,
        following_id: i64,
    ) -> Result<bool, ActivityError> {
        let follower = self.find_user(follower_id).await?;
        let following = self.find_user(following_id).await?;
        Ok(self.announce(BroadcastEvent::new_follow(&follower, &following, Utc::now())))
    }
}
