//! Stub push client for environments without provider credentials.

use async_trait::async_trait;

use super::{PushClient, PushError, PushOutcome};
use crate::domain::PushMessage;

/// Accepts every message and sends nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPushClient;

#[async_trait]
impl PushClient for DisabledPushClient {
    fn provider(&self) -> &'static str {
        "disabled"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn send(&self, message: &PushMessage) -> Result<PushOutcome, PushError> {
        tracing::debug!(title = %message.title, "Push stub: provider not configured");
        Ok(PushOutcome::Stubbed)
    }
}
