// Facade over the scheduling operations, shared by the daemon and the API

use super::instantiate::TemplateInstantiator;
use super::recurring::{GenerationReport, RecurringTaskGenerator};
use super::runner::{BundleRunner, CronRunReport};
use super::stage::{StageTransitions, TaskCompletion};
use crate::errors::EngineError;
use crate::models::Task;
use crate::storage::Stores;
use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Clone)]
pub struct SchedulingService {
    instantiator: TemplateInstantiator,
    generator: RecurringTaskGenerator,
    runner: BundleRunner,
    transitions: StageTransitions,
}

impl SchedulingService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            instantiator: TemplateInstantiator::new(stores),
            generator: RecurringTaskGenerator::new(stores),
            runner: BundleRunner::new(stores),
            transitions: StageTransitions::new(stores),
        }
    }

    pub async fn run_cron(&self, now: NaiveDate) -> Result<CronRunReport, EngineError> {
        self.runner.run_cron(now).await
    }

    pub async fn generate_recurring_tasks(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<GenerationReport, EngineError> {
        self.generator
            .generate_recurring_tasks(start_date, end_date)
            .await
    }

    pub async fn instantiate_template(
        &self,
        template_id: Uuid,
        bundle_id: Uuid,
        anchor_date: NaiveDate,
    ) -> Result<Vec<Task>, EngineError> {
        self.instantiator
            .instantiate_template(template_id, bundle_id, anchor_date)
            .await
    }

    pub async fn complete_task(&self, task_id: Uuid) -> Result<TaskCompletion, EngineError> {
        self.transitions.complete_task(task_id).await
    }
}

impl std::fmt::Debug for SchedulingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulingService").finish_non_exhaustive()
    }
}
