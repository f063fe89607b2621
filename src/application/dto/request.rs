//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

/// Update push token request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePushTokenRequest {
    #[validate(length(min = 1, max = 4096, message = "Token must be 1-4096 characters"))]
    pub token: String,
}
