//! Domain activities that notify another user.
//!
//! Every producer goes through [`Activity`] so each kind of domain event has
//! exactly one notification shape (kind, title, body, push data).

use crate::domain::entities::NotificationKind;

use super::push::PushData;

/// Kind of a chat message, used to build the notification preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePreview {
    /// Plain text message; the text itself is the preview
    Text(String),
    /// Secret (self-destructing) message; content is never previewed
    Secret,
    /// Any non-text message ("image", "voice", ...)
    Media(String),
}

impl MessagePreview {
    /// Classify a message the way the chat handlers store it.
    pub fn classify(message_type: &str, text: &str, is_secret: bool) -> Self {
        if is_secret {
            Self::Secret
        } else if message_type != "text" {
            Self::Media(message_type.to_string())
        } else {
            Self::Text(text.to_string())
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Secret => "Sent you a secret message 🕵️".to_string(),
            Self::Media(kind) => format!("Sent a {}", kind),
        }
    }
}

/// Something `actor` did that concerns a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Follow,
    FollowRequest,
    PostLike { post_id: i64 },
    CommentLike { post_id: i64, comment_id: i64 },
    Comment { post_id: i64 },
    Reply { post_id: i64, comment_id: i64 },
    Repost { post_id: i64 },
    StoryView { story_id: i64 },
    Message { chat_id: i64, preview: MessagePreview },
    /// Anonymous message; the actor is never revealed
    Tell,
    /// `context` names where the mention happened ("a post", "a comment")
    Mention { context: String },
}

/// Fully rendered notification content for one activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityNotice {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: PushData,
}

impl Activity {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Follow => NotificationKind::Follow,
            Self::FollowRequest => NotificationKind::FollowRequest,
            Self::PostLike { .. } | Self::CommentLike { .. } => NotificationKind::Like,
            Self::Comment { .. } => NotificationKind::Comment,
            Self::Reply { .. } => NotificationKind::Reply,
            Self::Repost { .. } => NotificationKind::Repost,
            Self::StoryView { .. } => NotificationKind::StoryView,
            Self::Message { .. } => NotificationKind::Message,
            Self::Tell => NotificationKind::Tell,
            Self::Mention { .. } => NotificationKind::Mention,
        }
    }

    /// Whether the notice reveals who the actor is.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Tell)
    }

    /// Render the notice. `actor_id` and `actor_name` identify who acted.
    pub fn notice(&self, actor_id: i64, actor_name: &str) -> ActivityNotice {
        let kind = self.kind();
        let mut data = PushData::new();
        data.insert("type".to_string(), kind.as_str().to_string());

        let (title, body) = match self {
            Self::Follow => {
                data.insert("user_id".into(), actor_id.to_string());
                (
                    "New Follower".to_string(),
                    format!("{} started following you!", actor_name),
                )
            }
            Self::FollowRequest => {
                data.insert("user_id".into(), actor_id.to_string());
                (
                    "New Follow Request".to_string(),
                    format!("{} wants to follow you.", actor_name),
                )
            }
            Self::PostLike { post_id } => {
                data.insert("post_id".into(), post_id.to_string());
                ("New Like".to_string(), format!("{} liked your post!", actor_name))
            }
            Self::CommentLike { post_id, comment_id } => {
                data.insert("post_id".into(), post_id.to_string());
                data.insert("comment_id".into(), comment_id.to_string());
                ("New Like".to_string(), format!("{} liked your comment!", actor_name))
            }
            Self::Comment { post_id } => {
                data.insert("post_id".into(), post_id.to_string());
                (
                    "New Comment".to_string(),
                    format!("{} commented on your post!", actor_name),
                )
            }
            Self::Reply { post_id, comment_id } => {
                data.insert("post_id".into(), post_id.to_string());
                data.insert("comment_id".into(), comment_id.to_string());
                (
                    "New Reply".to_string(),
                    format!("{} replied to your comment!", actor_name),
                )
            }
            Self::Repost { post_id } => {
                data.insert("post_id".into(), post_id.to_string());
                ("New Repost".to_string(), format!("{} shared your post!", actor_name))
            }
            Self::StoryView { story_id } => {
                data.insert("story_id".into(), story_id.to_string());
                ("Story View".to_string(), format!("{} viewed your story!", actor_name))
            }
            Self::Message { chat_id, preview } => {
                data.insert("chat_id".into(), chat_id.to_string());
                (format!("New Message from {}", actor_name), preview.render())
            }
            Self::Tell => (
                "New Anonymous Tell".to_string(),
                "Someone sent you a new anonymous message!".to_string(),
            ),
            Self::Mention { context } => (
                "New Mention".to_string(),
                format!("{} mentioned you in {}", actor_name, context),
            ),
        };

        ActivityNotice {
            kind,
            title,
            body,
            data,
        }
    }
}
