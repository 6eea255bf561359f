// Recurring config repository implementation

use super::queries::recurring_queries;
use crate::db::DbPool;
use crate::errors::StorageError;
use crate::models::RecurringConfig;
use crate::storage::RecurringConfigStore;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;

pub struct RecurringConfigRepository {
    pool: DbPool,
}

impl RecurringConfigRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Result<RecurringConfig, StorageError> {
        Ok(RecurringConfig {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            cron_expression: row.try_get("cron_expression")?,
            assignee_id: row.try_get("assignee_id")?,
            enabled: row.try_get("enabled")?,
            created_at: row.try_get("created_at")?,
        })
    }

    #[instrument(skip(self, config), fields(config_id = %config.id))]
    pub async fn upsert(&self, config: &RecurringConfig) -> Result<(), StorageError> {
        config
            .validate()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO recurring_configs (
                id, description, cron_expression, assignee_id, enabled, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                description = EXCLUDED.description,
                cron_expression = EXCLUDED.cron_expression,
                assignee_id = EXCLUDED.assignee_id,
                enabled = EXCLUDED.enabled
            "#,
        )
        .bind(config.id)
        .bind(&config.description)
        .bind(&config.cron_expression)
        .bind(&config.assignee_id)
        .bind(config.enabled)
        .bind(config.created_at)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RecurringConfigStore for RecurringConfigRepository {
    #[instrument(skip(self))]
    async fn list_enabled_recurring_configs(&self) -> Result<Vec<RecurringConfig>, StorageError> {
        let query = format!(
            "SELECT {} FROM recurring_configs WHERE enabled = true ORDER BY created_at, id",
            recurring_queries::SELECT_ALL_COLUMNS
        );
        let rows = sqlx::query(&query).fetch_all(self.pool.pool()).await?;

        rows.iter().map(Self::from_row).collect()
    }
}
