//! User entity and repository trait.
//!
//! Maps to the `users` table owned by the account/profile handlers. Only the
//! columns the notification pipeline reads are modelled here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::PushTarget;
use crate::shared::error::AppError;

/// Identity of a user as seen by the notification pipeline.
///
/// Maps to the `users` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - name: VARCHAR(191) NULL (display name)
/// - username: VARCHAR(191) NOT NULL UNIQUE
/// - avatar: TEXT NULL
/// - fcm_token: TEXT NULL (device push token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Display name, may be empty
    pub name: Option<String>,

    /// Unique handle used in `@mentions`
    pub username: String,

    /// Avatar URL or path
    pub avatar: Option<String>,

    /// Device push token
    #[serde(skip_serializing)]
    pub fcm_token: Option<String>,
}

impl User {
    /// Name shown to other users in notification bodies.
    ///
    /// Falls back to the username when no display name is set.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// Avatar for broadcast payloads, empty when unset.
    pub fn avatar_url(&self) -> &str {
        self.avatar.as_deref().unwrap_or_default()
    }

    /// The push target for this user, if a non-empty token is stored.
    pub fn push_target(&self) -> Option<PushTarget> {
        self.fcm_token
            .as_deref()
            .and_then(|token| PushTarget::new(token).ok())
    }
}

/// Repository trait for User lookups used by the notification pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by exact (case-sensitive) username match.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Replace the user's device push token.
    async fn update_push_token(&self, id: i64, token: &str) -> Result<(), AppError>;
}
