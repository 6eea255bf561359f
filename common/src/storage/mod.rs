// Collaborator contracts consumed by the scheduling engine
//
// Stores enforce the two occurrence keys themselves: a second task with the
// same `(recurring_config_id, date)` or a second bundle with the same
// `(template_id, anchor_date)` is rejected with `StorageError::DuplicateKey`.

pub mod memory;

pub use memory::MemoryStore;

use crate::errors::StorageError;
use crate::models::{
    Bundle, BundleStage, NewBundle, NewNotification, NewTask, Notification, RecurringConfig, Task,
    TaskStatus, Template,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>, StorageError>;

    async fn list_templates(&self) -> Result<Vec<Template>, StorageError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BundleStore: Send + Sync {
    /// Persist a bundle; fails with `DuplicateKey` if its occurrence key exists
    async fn create_bundle(&self, bundle: NewBundle) -> Result<Bundle, StorageError>;

    async fn list_bundles(&self) -> Result<Vec<Bundle>, StorageError>;

    async fn get_bundle(&self, id: Uuid) -> Result<Option<Bundle>, StorageError>;

    async fn update_bundle_stage(&self, id: Uuid, stage: BundleStage)
        -> Result<Bundle, StorageError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a task; recurring tasks fail with `DuplicateKey` if their
    /// `(recurring_config_id, date)` already exists
    async fn create_task(&self, task: NewTask) -> Result<Task, StorageError>;

    async fn find_recurring_task(
        &self,
        recurring_config_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Task>, StorageError>;

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StorageError>;

    async fn update_task_status(&self, id: Uuid, status: TaskStatus)
        -> Result<Task, StorageError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecurringConfigStore: Send + Sync {
    async fn list_enabled_recurring_configs(&self) -> Result<Vec<RecurringConfig>, StorageError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, StorageError>;
}

/// Handle to every collaborator store the engine talks to
#[derive(Clone)]
pub struct Stores {
    pub templates: Arc<dyn TemplateStore>,
    pub bundles: Arc<dyn BundleStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub recurring: Arc<dyn RecurringConfigStore>,
    pub notifications: Arc<dyn NotificationSink>,
}

impl Stores {
    /// Use one backend for every collaborator
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: TemplateStore
            + BundleStore
            + TaskStore
            + RecurringConfigStore
            + NotificationSink
            + 'static,
    {
        Self {
            templates: store.clone(),
            bundles: store.clone(),
            tasks: store.clone(),
            recurring: store.clone(),
            notifications: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
