// Task completion and the bundle stage it may request

use crate::errors::EngineError;
use crate::models::{BundleStage, Task, TaskStatus};
use crate::storage::{BundleStore, Stores, TaskStore, TemplateStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCompletion {
    pub task: Task,
    /// Stage written to the owning bundle, if the task's definition asked for one
    pub stage_applied: Option<BundleStage>,
}

/// Applies `stage_on_complete` when a template task transitions to done
///
/// The stage is assigned unconditionally: an earlier stage may overwrite a
/// later one if tasks complete out of order.
#[derive(Clone)]
pub struct StageTransitions {
    templates: Arc<dyn TemplateStore>,
    bundles: Arc<dyn BundleStore>,
    tasks: Arc<dyn TaskStore>,
}

impl StageTransitions {
    pub fn new(stores: &Stores) -> Self {
        Self {
            templates: stores.templates.clone(),
            bundles: stores.bundles.clone(),
            tasks: stores.tasks.clone(),
        }
    }

    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn complete_task(&self, task_id: Uuid) -> Result<TaskCompletion, EngineError> {
        let task = self
            .tasks
            .get_task(task_id)
            .await?
            .ok_or(EngineError::TaskNotFound(task_id))?;

        if task.status == TaskStatus::Done {
            debug!("Task already done");
            return Ok(TaskCompletion {
                task,
                stage_applied: None,
            });
        }

        let task = self.tasks.update_task_status(task_id, TaskStatus::Done).await?;
        let stage_applied = self.apply_stage_on_complete(&task).await?;

        info!(stage_applied = ?stage_applied, "Task completed");
        Ok(TaskCompletion {
            task,
            stage_applied,
        })
    }

    async fn apply_stage_on_complete(&self, task: &Task) -> Result<Option<BundleStage>, EngineError> {
        let (Some(bundle_id), Some(ref_id)) = (task.bundle_id, task.template_task_ref.as_deref())
        else {
            return Ok(None);
        };

        let bundle = self
            .bundles
            .get_bundle(bundle_id)
            .await?
            .ok_or(EngineError::BundleNotFound(bundle_id))?;
        let Some(template_id) = bundle.template_id else {
            return Ok(None);
        };

        // A deleted template leaves its bundles without stage automation
        let Some(template) = self.templates.get_template(template_id).await? else {
            return Ok(None);
        };
        let Some(stage) = template.definition(ref_id).and_then(|d| d.stage_on_complete) else {
            return Ok(None);
        };

        self.bundles.update_bundle_stage(bundle_id, stage).await?;
        info!(bundle_id = %bundle_id, from = %bundle.stage, to = %stage, "Bundle stage set");
        Ok(Some(stage))
    }
}
