// Recurring task generation over a bounded date range

use crate::cron::cron_matches_date;
use crate::dates::{days_in_range, validate_range};
use crate::errors::{EngineError, StorageError};
use crate::models::{NewTask, RecurringConfig, Task};
use crate::storage::{RecurringConfigStore, Stores, TaskStore};
use crate::telemetry::{self, OccurrenceKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of one generation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<Task>,
    pub skipped: usize,
}

/// Every `(config, date)` occurrence due in `[start, end]`, day by day and in
/// config order within a day
pub fn due_occurrences<'a>(
    configs: &'a [RecurringConfig],
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = (&'a RecurringConfig, NaiveDate)> + 'a {
    days_in_range(start, end).flat_map(move |date| {
        configs
            .iter()
            .filter(move |config| cron_matches_date(&config.cron_expression, date))
            .map(move |config| (config, date))
    })
}

/// Creates the missing occurrences of every enabled recurring config
///
/// `(recurring_config_id, date)` is the idempotency key: re-running over an
/// overlapping range only counts the existing occurrences as skipped.
#[derive(Clone)]
pub struct RecurringTaskGenerator {
    configs: Arc<dyn RecurringConfigStore>,
    tasks: Arc<dyn TaskStore>,
}

impl RecurringTaskGenerator {
    pub fn new(stores: &Stores) -> Self {
        Self {
            configs: stores.recurring.clone(),
            tasks: stores.tasks.clone(),
        }
    }

    #[instrument(skip(self), fields(start_date = %start_date, end_date = %end_date))]
    pub async fn generate_recurring_tasks(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<GenerationReport, EngineError> {
        validate_range(start_date, end_date)?;

        let configs = self.configs.list_enabled_recurring_configs().await?;
        debug!(config_count = configs.len(), "Loaded enabled recurring configs");

        let mut report = GenerationReport::default();

        for (config, date) in due_occurrences(&configs, start_date, end_date) {
            if self.tasks.find_recurring_task(config.id, date).await?.is_some() {
                report.skipped += 1;
                telemetry::record_occurrence_skipped(OccurrenceKind::RecurringTask);
                continue;
            }

            match self.tasks.create_task(NewTask::recurring(config, date)).await {
                Ok(task) => {
                    debug!(config_id = %config.id, date = %date, task_id = %task.id, "Recurring task created");
                    telemetry::record_recurring_task_generated(&config.id);
                    report.generated.push(task);
                }
                Err(StorageError::DuplicateKey(key)) => {
                    // Another writer created it between the lookup and the insert
                    warn!(config_id = %config.id, date = %date, key = %key, "Recurring task already exists");
                    report.skipped += 1;
                    telemetry::record_occurrence_skipped(OccurrenceKind::RecurringTask);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            generated = report.generated.len(),
            skipped = report.skipped,
            "Recurring task generation finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use crate::models::TaskSource;
    use crate::storage::{MemoryStore, MockRecurringConfigStore, MockTaskStore};
    use chrono::Utc;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(expression: &str) -> RecurringConfig {
        RecurringConfig {
            id: Uuid::new_v4(),
            description: format!("Recurring {}", expression),
            cron_expression: expression.to_string(),
            assignee_id: None,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    async fn generator_with(configs: Vec<RecurringConfig>) -> (RecurringTaskGenerator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for c in configs {
            store.put_recurring_config(c).await;
        }
        (RecurringTaskGenerator::new(&Stores::shared(store.clone())), store)
    }

    #[test]
    fn test_due_occurrences_orders_by_day_then_config() {
        let daily = config("0 9 * * *");
        let wednesdays = config("0 9 * * 3");
        let configs = vec![daily.clone(), wednesdays.clone()];
        let due: Vec<_> = due_occurrences(&configs, date(2028, 2, 1), date(2028, 2, 2))
            .map(|(c, d)| (c.id, d))
            .collect();
        assert_eq!(
            due,
            vec![
                (daily.id, date(2028, 2, 1)),
                (daily.id, date(2028, 2, 2)),
                (wednesdays.id, date(2028, 2, 2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_weekly_config_generates_matching_days() {
        let (generator, _) = generator_with(vec![config("0 9 * * 3")]).await;
        let report = generator
            .generate_recurring_tasks(date(2028, 2, 1), date(2028, 2, 14))
            .await
            .unwrap();
        let dates: Vec<_> = report.generated.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![date(2028, 2, 2), date(2028, 2, 9)]);
        assert_eq!(report.skipped, 0);
        assert!(report
            .generated
            .iter()
            .all(|t| t.source == TaskSource::Recurring));
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let (generator, store) = generator_with(vec![config("0 9 15 * *")]).await;
        let first = generator
            .generate_recurring_tasks(date(2028, 6, 1), date(2028, 8, 30))
            .await
            .unwrap();
        assert_eq!(first.generated.len(), 3);

        let second = generator
            .generate_recurring_tasks(date(2028, 6, 1), date(2028, 8, 30))
            .await
            .unwrap();
        assert!(second.generated.is_empty());
        assert_eq!(second.skipped, 3);
        assert_eq!(store.tasks().await.len(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_range_only_creates_new_days() {
        let (generator, _) = generator_with(vec![config("* * * * *")]).await;
        generator
            .generate_recurring_tasks(date(2028, 1, 1), date(2028, 1, 5))
            .await
            .unwrap();
        let report = generator
            .generate_recurring_tasks(date(2028, 1, 4), date(2028, 1, 8))
            .await
            .unwrap();
        assert_eq!(report.generated.len(), 3);
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_disabled_configs_are_ignored() {
        let mut disabled = config("* * * * *");
        disabled.enabled = false;
        let (generator, store) = generator_with(vec![disabled]).await;
        let report = generator
            .generate_recurring_tasks(date(2028, 1, 1), date(2028, 1, 31))
            .await
            .unwrap();
        assert!(report.generated.is_empty());
        assert!(store.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_reversed_range_creates_nothing() {
        let (generator, store) = generator_with(vec![config("* * * * *")]).await;
        let err = generator
            .generate_recurring_tasks(date(2028, 3, 10), date(2028, 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidRange { .. })
        ));
        assert!(store.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_range_is_rejected() {
        let (generator, _) = generator_with(vec![config("* * * * *")]).await;
        let result = generator
            .generate_recurring_tasks(date(2028, 1, 1), date(2028, 4, 1))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_on_insert_counts_as_skipped() {
        let c = config("* * * * *");
        let mut configs = MockRecurringConfigStore::new();
        let listed = vec![c];
        configs
            .expect_list_enabled_recurring_configs()
            .returning(move || Ok(listed.clone()));

        let mut tasks = MockTaskStore::new();
        tasks.expect_find_recurring_task().returning(|_, _| Ok(None));
        tasks
            .expect_create_task()
            .returning(|_| Err(StorageError::DuplicateKey("tasks_recurring_occurrence".into())));

        let generator = RecurringTaskGenerator {
            configs: Arc::new(configs),
            tasks: Arc::new(tasks),
        };
        let report = generator
            .generate_recurring_tasks(date(2028, 1, 1), date(2028, 1, 2))
            .await
            .unwrap();
        assert!(report.generated.is_empty());
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_transient_failure_propagates() {
        let mut configs = MockRecurringConfigStore::new();
        configs
            .expect_list_enabled_recurring_configs()
            .returning(|| Err(StorageError::DatabaseError("pool timed out".into())));
        let mut tasks = MockTaskStore::new();
        tasks.expect_create_task().never();

        let generator = RecurringTaskGenerator {
            configs: Arc::new(configs),
            tasks: Arc::new(tasks),
        };
        let err = generator
            .generate_recurring_tasks(date(2028, 1, 1), date(2028, 1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
    }
}
