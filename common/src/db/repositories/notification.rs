// Notification repository implementation

use crate::db::DbPool;
use crate::errors::StorageError;
use crate::models::{NewNotification, Notification};
use crate::storage::NotificationSink;
use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

pub struct NotificationRepository {
    pool: DbPool,
}

impl NotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for NotificationRepository {
    #[instrument(skip(self, notification), fields(bundle_id = ?notification.bundle_id))]
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, StorageError> {
        let notification = notification.into_notification(Uuid::new_v4(), Utc::now());

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, message, bundle_id, template_id, user_id, dismissed, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id)
        .bind(&notification.message)
        .bind(notification.bundle_id)
        .bind(notification.template_id)
        .bind(&notification.user_id)
        .bind(notification.dismissed)
        .bind(notification.created_at)
        .execute(self.pool.pool())
        .await?;

        Ok(notification)
    }
}
