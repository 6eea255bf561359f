// Bundle repository implementation
//
// The partial unique index `bundles_template_occurrence` rejects a second
// bundle for the same template and anchor date; the insert surfaces it as
// `StorageError::DuplicateKey`.

use super::parse_column;
use super::queries::bundle_queries;
use crate::db::DbPool;
use crate::errors::StorageError;
use crate::models::{Bundle, BundleStage, NewBundle};
use crate::storage::BundleStore;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

pub struct BundleRepository {
    pool: DbPool,
}

impl BundleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Result<Bundle, StorageError> {
        let stage: String = row.try_get("stage")?;
        let status: String = row.try_get("status")?;
        let links: serde_json::Value = row.try_get("bundle_link_definitions")?;

        Ok(Bundle {
            id: row.try_get("id")?,
            template_id: row.try_get("template_id")?,
            title: row.try_get("title")?,
            anchor_date: row.try_get("anchor_date")?,
            stage: parse_column("stage", &stage)?,
            status: parse_column("status", &status)?,
            emoji: row.try_get("emoji")?,
            tags: row.try_get("tags")?,
            references: row.try_get("reference_list")?,
            bundle_link_definitions: serde_json::from_value(links)?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl BundleStore for BundleRepository {
    #[instrument(skip(self, bundle), fields(template_id = ?bundle.template_id, anchor_date = %bundle.anchor_date))]
    async fn create_bundle(&self, bundle: NewBundle) -> Result<Bundle, StorageError> {
        let bundle = bundle.into_bundle(Uuid::new_v4(), Utc::now());

        sqlx::query(
            r#"
            INSERT INTO bundles (
                id, template_id, title, anchor_date, stage, status,
                emoji, tags, reference_list, bundle_link_definitions, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(bundle.id)
        .bind(bundle.template_id)
        .bind(&bundle.title)
        .bind(bundle.anchor_date)
        .bind(bundle.stage.to_string())
        .bind(bundle.status.to_string())
        .bind(&bundle.emoji)
        .bind(&bundle.tags)
        .bind(&bundle.references)
        .bind(serde_json::to_value(&bundle.bundle_link_definitions)?)
        .bind(bundle.created_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(bundle_id = %bundle.id, title = %bundle.title, "Bundle created");
        Ok(bundle)
    }

    #[instrument(skip(self))]
    async fn list_bundles(&self) -> Result<Vec<Bundle>, StorageError> {
        let query = format!(
            "SELECT {} FROM bundles ORDER BY anchor_date, created_at",
            bundle_queries::SELECT_ALL_COLUMNS
        );
        let rows = sqlx::query(&query).fetch_all(self.pool.pool()).await?;

        rows.iter().map(Self::from_row).collect()
    }

    #[instrument(skip(self))]
    async fn get_bundle(&self, id: Uuid) -> Result<Option<Bundle>, StorageError> {
        let query = format!(
            "SELECT {} FROM bundles WHERE id = $1",
            bundle_queries::SELECT_ALL_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn update_bundle_stage(
        &self,
        id: Uuid,
        stage: BundleStage,
    ) -> Result<Bundle, StorageError> {
        let query = format!(
            "UPDATE bundles SET stage = $2 WHERE id = $1 RETURNING {}",
            bundle_queries::SELECT_ALL_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(stage.to_string())
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("bundle {}", id)))?;

        Self::from_row(&row)
    }
}
