// Task repository implementation
//
// Recurring occurrences are guarded by the partial unique index
// `tasks_recurring_occurrence` on `(recurring_config_id, date)`.

use super::parse_column;
use super::queries::task_queries;
use crate::db::DbPool;
use crate::errors::StorageError;
use crate::models::{NewTask, Task, TaskStatus};
use crate::storage::TaskStore;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

pub struct TaskRepository {
    pool: DbPool,
}

impl TaskRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Result<Task, StorageError> {
        let status: String = row.try_get("status")?;
        let source: String = row.try_get("source")?;

        Ok(Task {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            status: parse_column("status", &status)?,
            source: parse_column("source", &source)?,
            bundle_id: row.try_get("bundle_id")?,
            recurring_config_id: row.try_get("recurring_config_id")?,
            template_task_ref: row.try_get("template_task_ref")?,
            assignee_id: row.try_get("assignee_id")?,
            instructions_url: row.try_get("instructions_url")?,
            required_link_name: row.try_get("required_link_name")?,
            requires_file: row.try_get("requires_file")?,
            is_milestone: row.try_get("is_milestone")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    #[instrument(skip(self, task), fields(date = %task.date, source = %task.source))]
    async fn create_task(&self, task: NewTask) -> Result<Task, StorageError> {
        let task = task.into_task(Uuid::new_v4(), Utc::now());

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, description, date, status, source, bundle_id,
                recurring_config_id, template_task_ref, assignee_id,
                instructions_url, required_link_name, requires_file,
                is_milestone, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(task.id)
        .bind(&task.description)
        .bind(task.date)
        .bind(task.status.to_string())
        .bind(task.source.to_string())
        .bind(task.bundle_id)
        .bind(task.recurring_config_id)
        .bind(&task.template_task_ref)
        .bind(&task.assignee_id)
        .bind(&task.instructions_url)
        .bind(&task.required_link_name)
        .bind(task.requires_file)
        .bind(task.is_milestone)
        .bind(task.created_at)
        .execute(self.pool.pool())
        .await?;

        tracing::debug!(task_id = %task.id, "Task created");
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn find_recurring_task(
        &self,
        recurring_config_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Task>, StorageError> {
        let query = format!(
            "SELECT {} FROM tasks WHERE recurring_config_id = $1 AND date = $2",
            task_queries::SELECT_ALL_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(recurring_config_id)
            .bind(date)
            .fetch_optional(self.pool.pool())
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StorageError> {
        let query = format!(
            "SELECT {} FROM tasks WHERE id = $1",
            task_queries::SELECT_ALL_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> Result<Task, StorageError> {
        let query = format!(
            "UPDATE tasks SET status = $2 WHERE id = $1 RETURNING {}",
            task_queries::SELECT_ALL_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(status.to_string())
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("task {}", id)))?;

        Self::from_row(&row)
    }
}
