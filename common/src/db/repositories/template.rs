// Template repository implementation

use super::parse_column;
use super::queries::template_queries;
use crate::db::DbPool;
use crate::errors::StorageError;
use crate::models::Template;
use crate::storage::TemplateStore;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

pub struct TemplateRepository {
    pool: DbPool,
}

impl TemplateRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Result<Template, StorageError> {
        let trigger_type: String = row.try_get("trigger_type")?;
        let task_definitions: serde_json::Value = row.try_get("task_definitions")?;
        let links: serde_json::Value = row.try_get("bundle_link_definitions")?;

        Ok(Template {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            template_type: row.try_get("template_type")?,
            task_definitions: serde_json::from_value(task_definitions)?,
            trigger_type: parse_column("trigger_type", &trigger_type)?,
            trigger_schedule: row.try_get("trigger_schedule")?,
            trigger_lead_days: row.try_get("trigger_lead_days")?,
            default_assignee_id: row.try_get("default_assignee_id")?,
            emoji: row.try_get("emoji")?,
            tags: row.try_get("tags")?,
            references: row.try_get("reference_list")?,
            bundle_link_definitions: serde_json::from_value(links)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Insert or replace a template
    #[instrument(skip(self, template), fields(template_id = %template.id))]
    pub async fn upsert(&self, template: &Template) -> Result<(), StorageError> {
        template
            .validate()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO templates (
                id, name, template_type, task_definitions, trigger_type,
                trigger_schedule, trigger_lead_days, default_assignee_id,
                emoji, tags, reference_list, bundle_link_definitions,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                template_type = EXCLUDED.template_type,
                task_definitions = EXCLUDED.task_definitions,
                trigger_type = EXCLUDED.trigger_type,
                trigger_schedule = EXCLUDED.trigger_schedule,
                trigger_lead_days = EXCLUDED.trigger_lead_days,
                default_assignee_id = EXCLUDED.default_assignee_id,
                emoji = EXCLUDED.emoji,
                tags = EXCLUDED.tags,
                reference_list = EXCLUDED.reference_list,
                bundle_link_definitions = EXCLUDED.bundle_link_definitions,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.template_type)
        .bind(serde_json::to_value(&template.task_definitions)?)
        .bind(template.trigger_type.to_string())
        .bind(&template.trigger_schedule)
        .bind(template.trigger_lead_days)
        .bind(&template.default_assignee_id)
        .bind(&template.emoji)
        .bind(&template.tags)
        .bind(&template.references)
        .bind(serde_json::to_value(&template.bundle_link_definitions)?)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(template_name = %template.name, "Template saved");
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for TemplateRepository {
    #[instrument(skip(self))]
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>, StorageError> {
        let query = format!(
            "SELECT {} FROM templates WHERE id = $1",
            template_queries::SELECT_ALL_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_templates(&self) -> Result<Vec<Template>, StorageError> {
        let query = format!(
            "SELECT {} FROM templates ORDER BY created_at, id",
            template_queries::SELECT_ALL_COLUMNS
        );
        let rows = sqlx::query(&query).fetch_all(self.pool.pool()).await?;

        let templates = rows
            .iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = templates.len(), "Loaded templates");
        Ok(templates)
    }
}
