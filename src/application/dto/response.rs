//! Response DTOs
//!
//! Data structures for API response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::NotificationDto;

/// Inbox notification response
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationDto> for NotificationResponse {
    fn from(dto: NotificationDto) -> Self {
        Self {
            id: dto.id,
            user_id: dto.recipient_id,
            kind: dto.kind,
            title: dto.title,
            body: dto.body,
            is_read: dto.is_read,
            created_at: dto.created_at,
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
