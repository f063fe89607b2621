//! Notification Inbox Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::application::dto::response::NotificationResponse;
use crate::application::services::{NotificationError, NotificationService};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List the caller's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = state
        .notification_service()
        .list_notifications(auth.user_id)
        .await
        .map_err(notification_error)?;

    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Mark one of the caller's notifications as read
pub async fn mark_as_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(notification_id): Path<i64>,
) -> Result<Json<NotificationResponse>, AppError> {
    let notification = state
        .notification_service()
        .mark_as_read(notification_id, auth.user_id)
        .await
        .map_err(notification_error)?;

    Ok(Json(notification.into()))
}

/// Map service errors onto HTTP errors.
pub(crate) fn notification_error(e: NotificationError) -> AppError {
    match e {
        NotificationError::NotFound => AppError::NotFound("Notification not found".into()),
        NotificationError::UserNotFound => AppError::NotFound("User not found".into()),
        NotificationError::Forbidden => {
            AppError::Forbidden("Notification belongs to another user".into())
        }
        NotificationError::InvalidPushToken => AppError::Validation(e.to_string()),
        e => AppError::Internal(e.to_string()),
    }
}
