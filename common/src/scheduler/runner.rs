// Bundle auto-creation: the once-daily pass over automatic templates

use super::instantiate::TemplateInstantiator;
use crate::cron::cron_matches_date;
use crate::dates::{add_days, human_date};
use crate::errors::{EngineError, StorageError};
use crate::models::{Bundle, NewBundle, NewNotification, Template};
use crate::storage::{BundleStore, NotificationSink, Stores, TemplateStore};
use crate::telemetry::{self, OccurrenceKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Outcome of one auto-creation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CronRunReport {
    pub created: Vec<Uuid>,
    pub skipped: usize,
}

/// Title of an automatically created bundle, e.g. `Newsletter – March 10, 2026`
pub fn bundle_title(template_name: &str, anchor_date: NaiveDate) -> String {
    format!("{} – {}", template_name, human_date(anchor_date))
}

/// The anchor date of the bundle `template` fires for on `now`, or `None`
/// when its schedule does not match that day
pub fn scheduled_anchor(template: &Template, now: NaiveDate) -> Result<Option<NaiveDate>, EngineError> {
    let Some(schedule) = template.automatic_schedule() else {
        return Ok(None);
    };
    if !cron_matches_date(schedule, now) {
        return Ok(None);
    }
    Ok(Some(add_days(now, i64::from(template.trigger_lead_days))?))
}

fn bundle_notification(template: &Template, bundle: &Bundle) -> NewNotification {
    NewNotification {
        message: format!("New bundle \"{}\" was created automatically", bundle.title),
        bundle_id: Some(bundle.id),
        template_id: Some(template.id),
        user_id: template.default_assignee_id.clone(),
    }
}

/// Creates one bundle per `(template_id, anchor_date)` for every automatic
/// template whose schedule fires on the run date
#[derive(Clone)]
pub struct BundleRunner {
    templates: Arc<dyn TemplateStore>,
    bundles: Arc<dyn BundleStore>,
    notifications: Arc<dyn NotificationSink>,
    instantiator: TemplateInstantiator,
}

impl BundleRunner {
    pub fn new(stores: &Stores) -> Self {
        Self {
            templates: stores.templates.clone(),
            bundles: stores.bundles.clone(),
            notifications: stores.notifications.clone(),
            instantiator: TemplateInstantiator::new(stores),
        }
    }

    /// Run the auto-creation pass for the calendar day `now`
    ///
    /// A store failure halts the remaining templates; bundles created before
    /// the failure stay, and a retry skips them by their occurrence key.
    #[instrument(skip(self), fields(now = %now))]
    pub async fn run_cron(&self, now: NaiveDate) -> Result<CronRunReport, EngineError> {
        let started = Instant::now();

        let templates = self.templates.list_templates().await?;
        let mut existing: HashSet<(Uuid, NaiveDate)> = self
            .bundles
            .list_bundles()
            .await?
            .iter()
            .filter_map(Bundle::occurrence_key)
            .collect();

        let mut report = CronRunReport::default();

        for template in templates.iter().filter(|t| t.automatic_schedule().is_some()) {
            let Some(anchor_date) = scheduled_anchor(template, now)? else {
                continue;
            };

            if existing.contains(&(template.id, anchor_date)) {
                debug!(template_id = %template.id, anchor_date = %anchor_date, "Bundle already exists");
                report.skipped += 1;
                telemetry::record_occurrence_skipped(OccurrenceKind::Bundle);
                continue;
            }

            let new_bundle = NewBundle::from_template(
                template,
                bundle_title(&template.name, anchor_date),
                anchor_date,
            );
            let bundle = match self.bundles.create_bundle(new_bundle).await {
                Ok(bundle) => bundle,
                Err(StorageError::DuplicateKey(key)) => {
                    warn!(template_id = %template.id, anchor_date = %anchor_date, key = %key, "Bundle created concurrently");
                    report.skipped += 1;
                    telemetry::record_occurrence_skipped(OccurrenceKind::Bundle);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            existing.insert((template.id, anchor_date));

            let tasks = self
                .instantiator
                .instantiate_template(template.id, bundle.id, anchor_date)
                .await?;

            if let Err(e) = self
                .notifications
                .create_notification(bundle_notification(template, &bundle))
                .await
            {
                warn!(bundle_id = %bundle.id, error = %e, "Failed to create bundle notification");
            }

            telemetry::record_bundle_created(&template.id);
            info!(
                template_id = %template.id,
                bundle_id = %bundle.id,
                anchor_date = %anchor_date,
                task_count = tasks.len(),
                "Bundle created"
            );
            report.created.push(bundle.id);
        }

        telemetry::record_cron_run_duration(started.elapsed().as_secs_f64());
        info!(
            created = report.created.len(),
            skipped = report.skipped,
            "Bundle auto-creation run finished"
        );

        Ok(report)
    }
}
