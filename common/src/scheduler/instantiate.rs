// Template instantiation: resolve task definitions against an anchor date

use crate::dates::add_days;
use crate::errors::{EngineError, ValidationError};
use crate::models::{NewTask, Task, Template};
use crate::storage::{Stores, TaskStore, TemplateStore};
use crate::telemetry;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Resolve every task definition of `template` into a dated task for `bundle_id`
///
/// Dates are `anchor_date + offset_days` in calendar days; offsets may be
/// negative, zero or positive. Definition order is preserved.
pub fn resolve_template_tasks(
    template: &Template,
    bundle_id: Uuid,
    anchor_date: NaiveDate,
) -> Result<Vec<NewTask>, ValidationError> {
    template
        .task_definitions
        .iter()
        .map(|definition| {
            let date = add_days(anchor_date, i64::from(definition.offset_days))?;
            Ok(NewTask::from_definition(definition, bundle_id, date))
        })
        .collect()
}

/// Materializes template definitions into persisted tasks
///
/// Not idempotent on its own: callers invoke it once, when the bundle is
/// created. A store failure part way through leaves the already created tasks
/// in place.
#[derive(Clone)]
pub struct TemplateInstantiator {
    templates: Arc<dyn TemplateStore>,
    tasks: Arc<dyn TaskStore>,
}

impl TemplateInstantiator {
    pub fn new(stores: &Stores) -> Self {
        Self {
            templates: stores.templates.clone(),
            tasks: stores.tasks.clone(),
        }
    }

    pub fn from_parts(templates: Arc<dyn TemplateStore>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { templates, tasks }
    }

    #[instrument(skip(self), fields(template_id = %template_id, bundle_id = %bundle_id, anchor_date = %anchor_date))]
    pub async fn instantiate_template(
        &self,
        template_id: Uuid,
        bundle_id: Uuid,
        anchor_date: NaiveDate,
    ) -> Result<Vec<Task>, EngineError> {
        let template = self
            .templates
            .get_template(template_id)
            .await?
            .ok_or(EngineError::TemplateNotFound(template_id))?;

        let planned = resolve_template_tasks(&template, bundle_id, anchor_date)?;

        let mut created = Vec::with_capacity(planned.len());
        for task in planned {
            debug!(date = %task.date, template_task_ref = ?task.template_task_ref, "Creating template task");
            created.push(self.tasks.create_task(task).await?);
        }

        telemetry::record_template_tasks_instantiated(&template_id, created.len());
        info!(
            template_name = %template.name,
            task_count = created.len(),
            "Template instantiated"
        );

        Ok(created)
    }
}
