// In-process store implementing every collaborator contract
//
// Used by tests and local runs. It enforces the same occurrence keys as the
// PostgreSQL schema so engine behavior is identical on both backends.

use super::{BundleStore, NotificationSink, RecurringConfigStore, TaskStore, TemplateStore};
use crate::errors::StorageError;
use crate::models::{
    Bundle, BundleStage, NewBundle, NewNotification, NewTask, Notification, RecurringConfig, Task,
    TaskStatus, Template,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    templates: Vec<Template>,
    recurring_configs: Vec<RecurringConfig>,
    bundles: Vec<Bundle>,
    tasks: Vec<Task>,
    notifications: Vec<Notification>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a template
    pub async fn put_template(&self, template: Template) {
        let mut state = self.state.write().await;
        state.templates.retain(|t| t.id != template.id);
        state.templates.push(template);
    }

    /// Insert or replace a recurring config
    pub async fn put_recurring_config(&self, config: RecurringConfig) {
        let mut state = self.state.write().await;
        state.recurring_configs.retain(|c| c.id != config.id);
        state.recurring_configs.push(config);
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>, StorageError> {
        let state = self.state.read().await;
        Ok(state.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn list_templates(&self) -> Result<Vec<Template>, StorageError> {
        Ok(self.state.read().await.templates.clone())
    }
}

#[async_trait]
impl BundleStore for MemoryStore {
    #[instrument(skip(self, bundle), fields(anchor_date = %bundle.anchor_date))]
    async fn create_bundle(&self, bundle: NewBundle) -> Result<Bundle, StorageError> {
        let mut state = self.state.write().await;

        if let Some(template_id) = bundle.template_id {
            let exists = state
                .bundles
                .iter()
                .any(|b| b.occurrence_key() == Some((template_id, bundle.anchor_date)));
            if exists {
                return Err(StorageError::DuplicateKey(format!(
                    "bundle for template {} on {}",
                    template_id, bundle.anchor_date
                )));
            }
        }

        let bundle = bundle.into_bundle(Uuid::new_v4(), Utc::now());
        state.bundles.push(bundle.clone());
        Ok(bundle)
    }

    async fn list_bundles(&self) -> Result<Vec<Bundle>, StorageError> {
        Ok(self.state.read().await.bundles.clone())
    }

    async fn get_bundle(&self, id: Uuid) -> Result<Option<Bundle>, StorageError> {
        let state = self.state.read().await;
        Ok(state.bundles.iter().find(|b| b.id == id).cloned())
    }

    async fn update_bundle_stage(
        &self,
        id: Uuid,
        stage: BundleStage,
    ) -> Result<Bundle, StorageError> {
        let mut state = self.state.write().await;
        let bundle = state
            .bundles
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("bundle {}", id)))?;
        bundle.stage = stage;
        Ok(bundle.clone())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    #[instrument(skip(self, task), fields(date = %task.date, source = %task.source))]
    async fn create_task(&self, task: NewTask) -> Result<Task, StorageError> {
        let mut state = self.state.write().await;

        if let Some(config_id) = task.recurring_config_id {
            let exists = state
                .tasks
                .iter()
                .any(|t| t.recurring_config_id == Some(config_id) && t.date == task.date);
            if exists {
                return Err(StorageError::DuplicateKey(format!(
                    "task for recurring config {} on {}",
                    config_id, task.date
                )));
            }
        }

        let task = task.into_task(Uuid::new_v4(), Utc::now());
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_recurring_task(
        &self,
        recurring_config_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Task>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.recurring_config_id == Some(recurring_config_id) && t.date == date)
            .cloned())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StorageError> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> Result<Task, StorageError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("task {}", id)))?;
        task.status = status;
        Ok(task.clone())
    }
}

#[async_trait]
impl RecurringConfigStore for MemoryStore {
    async fn list_enabled_recurring_configs(&self) -> Result<Vec<RecurringConfig>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .recurring_configs
            .iter()
            .filter(|c| c.enabled)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationSink for MemoryStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, StorageError> {
        let notification = notification.into_notification(Uuid::new_v4(), Utc::now());
        self.state
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BundleStatus, TaskSource};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn recurring_task(config_id: Uuid, on: NaiveDate) -> NewTask {
        NewTask {
            description: "Standup notes".to_string(),
            date: on,
            status: TaskStatus::Todo,
            source: TaskSource::Recurring,
            bundle_id: None,
            recurring_config_id: Some(config_id),
            template_task_ref: None,
            assignee_id: None,
            instructions_url: None,
            required_link_name: None,
            requires_file: false,
            is_milestone: false,
        }
    }

    fn bundle(template_id: Option<Uuid>, anchor: NaiveDate) -> NewBundle {
        NewBundle {
            template_id,
            title: "Issue".to_string(),
            anchor_date: anchor,
            stage: BundleStage::Preparation,
            status: BundleStatus::Active,
            emoji: None,
            tags: Vec::new(),
            references: Vec::new(),
            bundle_link_definitions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_recurring_task_key_is_unique() {
        let store = MemoryStore::new();
        let config_id = Uuid::new_v4();

        store
            .create_task(recurring_task(config_id, date(2028, 2, 2)))
            .await
            .unwrap();
        let err = store
            .create_task(recurring_task(config_id, date(2028, 2, 2)))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(_)));

        // Different day is a different occurrence
        store
            .create_task(recurring_task(config_id, date(2028, 2, 9)))
            .await
            .unwrap();
        assert_eq!(store.tasks().await.len(), 2);
    }

    #[tokio::test]
    async fn test_bundle_key_is_unique_per_template() {
        let store = MemoryStore::new();
        let template_id = Uuid::new_v4();
        let anchor = date(2026, 3, 10);

        store.create_bundle(bundle(Some(template_id), anchor)).await.unwrap();
        let err = store
            .create_bundle(bundle(Some(template_id), anchor))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(_)));

        // Bundles without a template have no occurrence key
        store.create_bundle(bundle(None, anchor)).await.unwrap();
        store.create_bundle(bundle(None, anchor)).await.unwrap();
        assert_eq!(store.list_bundles().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_missing_task_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_task_status(Uuid::new_v4(), TaskStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
