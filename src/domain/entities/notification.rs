//! Notification entity and repository trait.
//!
//! Maps to the `notifications` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Kind of a persisted notification, stored in the `type` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Mention,
    Follow,
    FollowRequest,
    Like,
    Comment,
    Reply,
    Repost,
    StoryView,
    Message,
    Tell,
    /// Kinds written by other producers that this crate does not know about
    #[serde(untagged)]
    Other(String),
}

impl NotificationKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s {
            "mention" => Self::Mention,
            "follow" => Self::Follow,
            "follow_request" => Self::FollowRequest,
            "like" => Self::Like,
            "comment" => Self::Comment,
            "reply" => Self::Reply,
            "repost" => Self::Repost,
            "story_view" => Self::StoryView,
            "message" => Self::Message,
            "tell" => Self::Tell,
            other => Self::Other(other.to_string()),
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mention => "mention",
            Self::Follow => "follow",
            Self::FollowRequest => "follow_request",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Reply => "reply",
            Self::Repost => "repost",
            Self::StoryView => "story_view",
            Self::Message => "message",
            Self::Tell => "tell",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted, per-recipient notification shown in the in-app inbox.
///
/// Maps to the `notifications` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - user_id: BIGINT NOT NULL (recipient)
/// - type: VARCHAR(64) NOT NULL
/// - title: TEXT NOT NULL
/// - body: TEXT NOT NULL
/// - is_read: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether `user_id` is allowed to read or mark this notification.
    pub fn belongs_to(&self, user_id: i64) -> bool {
        self.recipient_id == user_id
    }
}

/// Values for a notification row that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

/// Repository trait for Notification data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a single unread notification row.
    async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError>;

    /// Find a notification by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError>;

    /// All notifications for a recipient, newest first.
    async fn find_by_recipient(&self, recipient_id: i64) -> Result<Vec<Notification>, AppError>;

    /// Set `is_read` and return the updated row.
    async fn mark_read(&self, id: i64) -> Result<Notification, AppError>;
}
