//! User Handlers

use axum::{
    extract::{Extension, State},
    Json,
};

use super::notification::notification_error;
use crate::application::dto::request::UpdatePushTokenRequest;
use crate::application::dto::response::MessageResponse;
use crate::application::services::NotificationService;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Store the caller's device push token
pub async fn update_push_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdatePushTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_request(&body)?;

    state
        .notification_service()
        .update_push_target(auth.user_id, &body.token)
        .await
        .map_err(notification_error)?;

    Ok(Json(MessageResponse::new("FCM token updated")))
}
