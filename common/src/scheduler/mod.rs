// Scheduling operations: template instantiation, recurring generation,
// automatic bundle creation and the daily engine that drives them

pub mod engine;
pub mod instantiate;
pub mod recurring;
pub mod runner;
pub mod service;
pub mod stage;

pub use engine::{is_due, DailyRunSummary, Scheduler, SchedulerConfig, SchedulerEngine};
pub use instantiate::{resolve_template_tasks, TemplateInstantiator};
pub use recurring::{due_occurrences, GenerationReport, RecurringTaskGenerator};
pub use runner::{bundle_title, scheduled_anchor, BundleRunner, CronRunReport};
pub use service::SchedulingService;
pub use stage::{StageTransitions, TaskCompletion};
