//! Notification Repository Implementation
//!
//! PostgreSQL implementation of the NotificationRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewNotification, Notification, NotificationKind, NotificationRepository};
use crate::shared::error::AppError;

/// Database row representation of the `notifications` table.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    title: String,
    body: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> Notification {
        Notification {
            id: self.id,
            recipient_id: self.user_id,
            kind: NotificationKind::from_str(&self.kind),
            title: self.title,
            body: self.body,
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL notification repository implementation.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, type, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, type, title, body, is_read, created_at
            "#,
        )
        .bind(notification.recipient_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_notification())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, type, title, body, is_read, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_notification()))
    }

    async fn find_by_recipient(&self, recipient_id: i64) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, type, title, body, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_notification()).collect())
    }

    async fn mark_read(&self, id: i64) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1
            RETURNING id, user_id, type, title, body, is_read, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_notification())
            .ok_or_else(|| AppError::NotFound("Notification not found".into()))
    }
}
