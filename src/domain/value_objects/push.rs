//! Push delivery values: the device token and the provider-agnostic message.

use std::collections::BTreeMap;

/// A recipient's device push token. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PushTarget(String);

/// Returned when building a [`PushTarget`] from a blank token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("push token is empty")]
pub struct EmptyPushToken;

impl PushTarget {
    pub fn new(token: impl Into<String>) -> Result<Self, EmptyPushToken> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(EmptyPushToken);
        }
        Ok(Self(token))
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Flat string-to-string data used by clients to deep-link (`{"type":"like","post_id":"42"}`).
pub type PushData = BTreeMap<String, String>;

/// A single push notification addressed to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub target: PushTarget,
    pub title: String,
    pub body: String,
    pub data: PushData,
}

impl PushMessage {
    pub fn new(target: PushTarget, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            target,
            title: title.into(),
            body: body.into(),
            data: PushData::new(),
        }
    }

    pub fn with_data(mut self, data: PushData) -> Self {
        self.data = data;
        self
    }
}
