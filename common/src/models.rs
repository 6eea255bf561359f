use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

use crate::cron::validate_cron_expression;
use crate::errors::ValidationError;

// ============================================================================
// Template Models
// ============================================================================

/// Template is a reusable process blueprint (e.g. one newsletter cycle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: String,
    #[serde(default)]
    pub task_definitions: Vec<TaskDefinition>,
    #[serde(default)]
    pub trigger_type: TriggerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_schedule: Option<String>,
    #[serde(default)]
    pub trigger_lead_days: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub bundle_link_definitions: Vec<BundleLinkDefinition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// The cron schedule, when this template fires automatically
    pub fn automatic_schedule(&self) -> Option<&str> {
        match self.trigger_type {
            TriggerType::Automatic => self
                .trigger_schedule
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            TriggerType::Manual => None,
        }
    }

    pub fn definition(&self, ref_id: &str) -> Option<&TaskDefinition> {
        self.task_definitions.iter().find(|d| d.ref_id == ref_id)
    }

    /// Check template invariants: unique `ref_id`s and a well-formed
    /// schedule for automatic templates
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }

        let mut seen = HashSet::new();
        for definition in &self.task_definitions {
            if definition.ref_id.is_empty() {
                return Err(ValidationError::MissingField(
                    "task_definitions.ref_id".to_string(),
                ));
            }
            if !seen.insert(definition.ref_id.as_str()) {
                return Err(ValidationError::InvalidFieldValue {
                    field: "task_definitions.ref_id".to_string(),
                    reason: format!("duplicate ref_id '{}'", definition.ref_id),
                });
            }
        }

        if self.trigger_type == TriggerType::Automatic {
            match self.automatic_schedule() {
                Some(schedule) => validate_cron_expression(schedule)?,
                None => {
                    return Err(ValidationError::MissingField(
                        "trigger_schedule".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }
}

/// TaskDefinition is a template-owned blueprint resolved against an anchor date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub ref_id: String,
    pub description: String,
    pub offset_days: i32,
    #[serde(default)]
    pub is_milestone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_link_name: Option<String>,
    #[serde(default)]
    pub requires_file: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_on_complete: Option<BundleStage>,
}

/// A named link slot every bundle of a template carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLinkDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// TriggerType defines whether bundles are created by hand or by the daily run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    #[default]
    Manual,
    Automatic,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerType::Manual => write!(f, "manual"),
            TriggerType::Automatic => write!(f, "automatic"),
        }
    }
}

impl FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(TriggerType::Manual),
            "automatic" => Ok(TriggerType::Automatic),
            _ => Err(format!("Invalid trigger type: {}", s)),
        }
    }
}

// ============================================================================
// Recurring Task Models
// ============================================================================

/// RecurringConfig produces one task per matching calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringConfig {
    pub id: Uuid,
    pub description: String,
    pub cron_expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

impl RecurringConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description".to_string()));
        }
        validate_cron_expression(&self.cron_expression)
    }
}

// ============================================================================
// Task Models
// ============================================================================

/// Task is a single concrete, dated work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub date: NaiveDate,
    pub status: TaskStatus,
    pub source: TaskSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_config_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_task_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_link_name: Option<String>,
    #[serde(default)]
    pub requires_file: bool,
    #[serde(default)]
    pub is_milestone: bool,
    pub created_at: DateTime<Utc>,
}

/// NewTask carries the data for a task that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub description: String,
    pub date: NaiveDate,
    pub status: TaskStatus,
    pub source: TaskSource,
    pub bundle_id: Option<Uuid>,
    pub recurring_config_id: Option<Uuid>,
    pub template_task_ref: Option<String>,
    pub assignee_id: Option<String>,
    pub instructions_url: Option<String>,
    pub required_link_name: Option<String>,
    pub requires_file: bool,
    pub is_milestone: bool,
}

impl NewTask {
    /// The occurrence of a recurring config on `date`
    pub fn recurring(config: &RecurringConfig, date: NaiveDate) -> Self {
        Self {
            description: config.description.clone(),
            date,
            status: TaskStatus::Todo,
            source: TaskSource::Recurring,
            bundle_id: None,
            recurring_config_id: Some(config.id),
            template_task_ref: None,
            assignee_id: config.assignee_id.clone(),
            instructions_url: None,
            required_link_name: None,
            requires_file: false,
            is_milestone: false,
        }
    }

    /// A template definition materialized for a bundle on an already resolved date
    pub fn from_definition(definition: &TaskDefinition, bundle_id: Uuid, date: NaiveDate) -> Self {
        Self {
            description: definition.description.clone(),
            date,
            status: TaskStatus::Todo,
            source: TaskSource::Template,
            bundle_id: Some(bundle_id),
            recurring_config_id: None,
            template_task_ref: Some(definition.ref_id.clone()),
            assignee_id: definition.assignee_id.clone(),
            instructions_url: definition.instructions_url.clone(),
            required_link_name: definition.required_link_name.clone(),
            requires_file: definition.requires_file,
            is_milestone: definition.is_milestone,
        }
    }

    pub fn into_task(self, id: Uuid, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            description: self.description,
            date: self.date,
            status: self.status,
            source: self.source,
            bundle_id: self.bundle_id,
            recurring_config_id: self.recurring_config_id,
            template_task_ref: self.template_task_ref,
            assignee_id: self.assignee_id,
            instructions_url: self.instructions_url,
            required_link_name: self.required_link_name,
            requires_file: self.requires_file,
            is_milestone: self.is_milestone,
            created_at,
        }
    }
}

/// TaskStatus represents where a task is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Done,
    Archived,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "todo"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "done" => Ok(TaskStatus::Done),
            "archived" => Ok(TaskStatus::Archived),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

/// TaskSource records what created a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    Manual,
    Template,
    Recurring,
    Chat,
    Email,
}

impl std::fmt::Display for TaskSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskSource::Manual => write!(f, "manual"),
            TaskSource::Template => write!(f, "template"),
            TaskSource::Recurring => write!(f, "recurring"),
            TaskSource::Chat => write!(f, "chat"),
            TaskSource::Email => write!(f, "email"),
        }
    }
}

impl FromStr for TaskSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(TaskSource::Manual),
            "template" => Ok(TaskSource::Template),
            "recurring" => Ok(TaskSource::Recurring),
            "chat" => Ok(TaskSource::Chat),
            "email" => Ok(TaskSource::Email),
            _ => Err(format!("Invalid task source: {}", s)),
        }
    }
}

// ============================================================================
// Bundle Models
// ============================================================================

/// Bundle is one instantiated occurrence of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    pub title: String,
    pub anchor_date: NaiveDate,
    pub stage: BundleStage,
    pub status: BundleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub bundle_link_definitions: Vec<BundleLinkDefinition>,
    pub created_at: DateTime<Utc>,
}

impl Bundle {
    /// The `(template_id, anchor_date)` occurrence key, if template-backed
    pub fn occurrence_key(&self) -> Option<(Uuid, NaiveDate)> {
        self.template_id.map(|id| (id, self.anchor_date))
    }
}

/// NewBundle carries the data for a bundle that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewBundle {
    pub template_id: Option<Uuid>,
    pub title: String,
    pub anchor_date: NaiveDate,
    pub stage: BundleStage,
    pub status: BundleStatus,
    pub emoji: Option<String>,
    pub tags: Vec<String>,
    pub references: Vec<String>,
    pub bundle_link_definitions: Vec<BundleLinkDefinition>,
}

impl NewBundle {
    /// A fresh, active bundle for `template` anchored on `anchor_date`
    pub fn from_template(template: &Template, title: String, anchor_date: NaiveDate) -> Self {
        Self {
            template_id: Some(template.id),
            title,
            anchor_date,
            stage: BundleStage::Preparation,
            status: BundleStatus::Active,
            emoji: template.emoji.clone(),
            tags: template.tags.clone(),
            references: template.references.clone(),
            bundle_link_definitions: template.bundle_link_definitions.clone(),
        }
    }

    pub fn into_bundle(self, id: Uuid, created_at: DateTime<Utc>) -> Bundle {
        Bundle {
            id,
            template_id: self.template_id,
            title: self.title,
            anchor_date: self.anchor_date,
            stage: self.stage,
            status: self.status,
            emoji: self.emoji,
            tags: self.tags,
            references: self.references,
            bundle_link_definitions: self.bundle_link_definitions,
            created_at,
        }
    }
}

/// BundleStage is the workflow position of a bundle:
/// preparation, announced, after-event, done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleStage {
    Preparation,
    Announced,
    AfterEvent,
    Done,
}

impl std::fmt::Display for BundleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleStage::Preparation => write!(f, "preparation"),
            BundleStage::Announced => write!(f, "announced"),
            BundleStage::AfterEvent => write!(f, "after-event"),
            BundleStage::Done => write!(f, "done"),
        }
    }
}

impl FromStr for BundleStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparation" => Ok(BundleStage::Preparation),
            "announced" => Ok(BundleStage::Announced),
            "after-event" => Ok(BundleStage::AfterEvent),
            "done" => Ok(BundleStage::Done),
            _ => Err(format!("Invalid bundle stage: {}", s)),
        }
    }
}

/// BundleStatus represents whether a bundle is still being worked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleStatus {
    Active,
    Archived,
}

impl std::fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleStatus::Active => write!(f, "active"),
            BundleStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for BundleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BundleStatus::Active),
            "archived" => Ok(BundleStatus::Archived),
            _ => Err(format!("Invalid bundle status: {}", s)),
        }
    }
}

// ============================================================================
// Notification Models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub message: String,
    pub bundle_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub user_id: Option<String>,
}

impl NewNotification {
    pub fn into_notification(self, id: Uuid, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            message: self.message,
            bundle_id: self.bundle_id,
            template_id: self.template_id,
            user_id: self.user_id,
            dismissed: false,
            created_at,
        }
    }
}
