//! Broadcast events fanned out to every live flash subscriber.
//!
//! ## Wire format
//!
//! ```text
//! {"type":"post","title":"New Post!","body":"alice shared something new",
//!  "username":"alice","avatar":"/uploads/a.png","created_at":"2024-05-01T10:00:00+00:00"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::User;

/// Kind of a global activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastKind {
    Post,
    Follow,
    Trend,
}

impl BroadcastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Follow => "follow",
            Self::Trend => "trend",
        }
    }
}

/// An immutable activity event. Built by a producer, serialized once by the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastEvent {
    kind: BroadcastKind,
    title: String,
    body: String,
    actor_username: String,
    actor_avatar_url: String,
    occurred_at: DateTime<Utc>,
}

/// Borrowed view used for serialization.
#[derive(Serialize)]
struct WirePayload<'a> {
    #[serde(rename = "type")]
    kind: BroadcastKind,
    title: &'a str,
    body: &'a str,
    username: &'a str,
    avatar: &'a str,
    created_at: String,
}

impl BroadcastEvent {
    pub fn new(
        kind: BroadcastKind,
        title: impl Into<String>,
        body: impl Into<String>,
        actor_username: impl Into<String>,
        actor_avatar_url: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            actor_username: actor_username.into(),
            actor_avatar_url: actor_avatar_url.into(),
            occurred_at,
        }
    }

    /// "New Post!" event for a freshly created post.
    pub fn new_post(author: &User, created_at: DateTime<Utc>) -> Self {
        Self::new(
            BroadcastKind::Post,
            "New Post!",
            format!("{} shared something new", author.username),
            author.username.clone(),
            author.avatar_url(),
            created_at,
        )
    }

    /// "New Growth!" event for a completed (non-pending) follow.
    pub fn new_follow(follower: &User, following: &User, followed_at: DateTime<Utc>) -> Self {
        Self::new(
            BroadcastKind::Follow,
            "New Growth!",
            format!("{} started following {}", follower.username, following.username),
            follower.username.clone(),
            follower.avatar_url(),
            followed_at,
        )
    }

    pub fn kind(&self) -> BroadcastKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn actor_username(&self) -> &str {
        &self.actor_username
    }

    pub fn actor_avatar_url(&self) -> &str {
        &self.actor_avatar_url
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Serialize to the flat JSON object sent over the socket.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&WirePayload {
            kind: self.kind,
            title: &self.title,
            body: &self.body,
            username: &self.actor_username,
            avatar: &self.actor_avatar_url,
            created_at: self.occurred_at.to_rfc3339(),
        })
    }
}
