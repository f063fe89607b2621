//! Mention Service
//!
//! Turns `@username` tokens in free text into mention notifications.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::notification_service::{NotificationError, NotificationService};
use crate::domain::services::scan_mentions;
use crate::domain::{Activity, UserRepository};

/// Used when the actor can no longer be looked up.
const UNKNOWN_ACTOR: &str = "Someone";

/// Mention service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MentionService: Send + Sync {
    /// Notify every user mentioned in `text` by `actor_id`.
    ///
    /// `context_label` names where the mention happened ("a post",
    /// "a comment"). Returns the IDs of the notified users in order of first
    /// mention. Unknown usernames and self-mentions are skipped.
    async fn resolve_mentions(
        &self,
        text: &str,
        actor_id: i64,
        context_label: &str,
    ) -> Result<Vec<i64>, MentionError>;
}

/// Mention service errors
#[derive(Debug, thiserror::Error)]
pub enum MentionError {
    #[error("User lookup failed: {0}")]
    Lookup(String),

    #[error(transparent)]
    Notify(#[from] NotificationError),
}

/// MentionService implementation
pub struct MentionServiceImpl<U, S>
where
    U: UserRepository,
    S: NotificationService + ?Sized,
{
    user_repo: Arc<U>,
    notifications: Arc<S>,
}

impl<U, S> MentionServiceImpl<U, S>
where
    U: UserRepository,
    S: NotificationService + ?Sized,
{
    pub fn new(user_repo: Arc<U>, notifications: Arc<S>) -> Self {
        Self {
            user_repo,
            notifications,
        }
    }

    async fn actor_name(&self, actor_id: i64) -> Result<String, MentionError> {
        let actor = self
            .user_repo
            .find_by_id(actor_id)
            .await
            .map_err(|e| MentionError::Lookup(e.to_string()))?;

        Ok(actor
            .map(|a| a.display_name().to_string())
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string()))
    }
}

#[async_trait]
impl<U, S> MentionService for MentionServiceImpl<U, S>
where
    U: UserRepository + 'static,
    S: NotificationService + ?Sized + 'static,
{
    async fn resolve_mentions(
        &self,
        text: &str,
        actor_id: i64,
        context_label: &str,
    ) -> Result<Vec<i64>, MentionError> {
        // The scan borrows `text`; collect before the first await.
        let mut handles: Vec<&str> = Vec::new();
        for handle in scan_mentions(text) {
            if !handles.contains(&handle) {
                handles.push(handle);
            }
        }

        let mut notified = Vec::new();
        let mut seen = HashSet::new();
        let mut actor_name: Option<String> = None;

        for handle in handles {
            let Some(user) = self
                .user_repo
                .find_by_username(handle)
                .await
                .map_err(|e| MentionError::Lookup(e.to_string()))?
            else {
                continue;
            };

            if user.id == actor_id || !seen.insert(user.id) {
                continue;
            }

            let name = match &actor_name {
                Some(name) => name.clone(),
                None => {
                    let name = self.actor_name(actor_id).await?;
                    actor_name = Some(name.clone());
                    name
                }
            };

            let notice = Activity::Mention {
                context: context_label.to_string(),
            }
            .notice(actor_id, &name);

            self.notifications
                .notify_with_data(user.id, notice.kind, &notice.title, &notice.body, notice.data)
                .await?;

            notified.push(user.id);
        }

        if !notified.is_empty() {
            tracing::debug!(actor_id, context = context_label, recipients = ?notified, "Mentions notified");
        }

        Ok(notified)
    }
}
