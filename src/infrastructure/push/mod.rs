//! Push Notification Providers
//!
//! Provider-mediated delivery of a single push message to a device token.
//!
//! - **FcmPushClient**: Firebase Cloud Messaging HTTP v1 API
//! - **DisabledPushClient**: Logged no-op used when no credentials are configured

mod disabled;
mod fcm;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::PushSettings;
use crate::domain::PushMessage;

pub use disabled::DisabledPushClient;
pub use fcm::{FcmPushClient, ServiceAccount};

/// Result of a push attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Accepted by the provider
    Sent { message_id: String },
    /// No provider configured; nothing left the process
    Stubbed,
}

/// Push provider errors.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Invalid push credentials: {0}")]
    Credentials(String),

    #[error("Push authorization failed: {0}")]
    Auth(String),

    #[error("Push request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push rejected by provider ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// A push provider. Implementations must be cheap to share across tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushClient: Send + Sync {
    /// Short provider name for logs ("fcm", "disabled").
    fn provider(&self) -> &'static str;

    /// Whether sends reach a real provider.
    fn is_configured(&self) -> bool;

    /// Attempt exactly one delivery of `message`.
    async fn send(&self, message: &PushMessage) -> Result<PushOutcome, PushError>;
}

/// Build the push client for the configured credentials.
///
/// Missing or unusable credentials yield a [`DisabledPushClient`]; this is
/// never a startup error.
pub fn create_push_client(settings: &PushSettings) -> Arc<dyn PushClient> {
    let raw = match settings.load_service_account() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::warn!(
                "No push service account configured (FIREBASE_SERVICE_ACCOUNT / push.service_account_path); push notifications disabled"
            );
            return Arc::new(DisabledPushClient);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read push service account; push notifications disabled");
            return Arc::new(DisabledPushClient);
        }
    };

    match ServiceAccount::from_json(&raw)
        .and_then(|account| FcmPushClient::new(account, settings))
    {
        Ok(client) => {
            tracing::info!(project_id = %client.project_id(), "FCM push client initialized");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to initialize FCM client; push notifications disabled");
            Arc::new(DisabledPushClient)
        }
    }
}
