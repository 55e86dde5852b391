//! Remote backend abstraction for the Todoist account.
//!
//! This module defines the entity types exchanged with the remote API, the
//! typed creation arguments, and the [`Backend`] trait implemented by the
//! real HTTP client in [`todoist`] and by test doubles. All operations are
//! synchronous blocking calls; the caller proceeds sequentially and any
//! non-success response surfaces immediately as a [`BackendError`].

pub mod todoist;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Error type for remote operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// A project in the remote account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "favorite")]
    pub is_favorite: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// A section, owned by a project. The same section name may exist under
/// different projects without collision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub order: i32,
}

/// A label, globally unique by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "favorite")]
    pub is_favorite: bool,
    #[serde(default)]
    pub order: i32,
}

/// Due specification of a task, exactly one representation set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Due {
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, alias = "recurring")]
    pub is_recurring: bool,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// A task in the remote account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "completed")]
    pub is_completed: bool,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub due: Option<Due>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Creation arguments for a project.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateProjectArgs {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

/// Creation arguments for a section.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateSectionArgs {
    pub name: String,
    pub project_id: String,
}

/// Creation arguments for a label.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateLabelArgs {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

/// Creation arguments for a task. At most one of `section_id`,
/// `project_id` and `parent_id` may be set; see [`CreateTaskArgs::place`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateTaskArgs {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_datetime: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl CreateTaskArgs {
    /// Apply the single placement reference: a section takes precedence
    /// over a project, a project over a parent task.
    pub fn place(
        &mut self,
        project_id: Option<&str>,
        section_id: Option<&str>,
        parent_id: Option<&str>,
    ) {
        if let Some(id) = section_id {
            self.section_id = Some(id.to_string());
        } else if let Some(id) = project_id {
            self.project_id = Some(id.to_string());
        } else if let Some(id) = parent_id {
            self.parent_id = Some(id.to_string());
        }
    }
}

/// One record of a sync command batch: operation type, per-run temporary
/// id, correlation uuid and operation arguments.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncCommand {
    #[serde(rename = "type")]
    pub kind: String,
    pub temp_id: String,
    pub uuid: String,
    pub args: Value,
}

impl SyncCommand {
    pub fn new(kind: &str, temp_id: String, args: Value) -> Self {
        Self {
            kind: kind.to_string(),
            temp_id,
            uuid: Uuid::new_v4().to_string(),
            args,
        }
    }
}

/// Result of a sync command batch. `sync_status` maps each command's
/// correlation uuid to `"ok"` or an error object.
#[derive(Debug, Default, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub sync_status: HashMap<String, Value>,
    #[serde(default)]
    pub temp_id_mapping: HashMap<String, String>,
}

impl SyncResponse {
    /// First command the remote rejected, as (correlation uuid, detail).
    pub fn first_error(&self) -> Option<(&str, String)> {
        self.sync_status
            .iter()
            .find(|(_, status)| status.as_str() != Some("ok"))
            .map(|(uuid, status)| (uuid.as_str(), status.to_string()))
    }
}

/// Synchronous operations against the remote account, used by the
/// materializer, the importers and the backup planner.
pub trait Backend {
    fn projects(&self) -> Result<Vec<Project>, BackendError>;
    fn sections(&self) -> Result<Vec<Section>, BackendError>;
    fn labels(&self) -> Result<Vec<Label>, BackendError>;
    fn tasks(&self) -> Result<Vec<Task>, BackendError>;

    fn create_project(&self, args: &CreateProjectArgs) -> Result<Project, BackendError>;
    fn create_section(&self, args: &CreateSectionArgs) -> Result<Section, BackendError>;
    fn create_label(&self, args: &CreateLabelArgs) -> Result<Label, BackendError>;
    fn create_task(&self, args: &CreateTaskArgs) -> Result<Task, BackendError>;

    /// Full account read via the sync endpoint; returns the payload
    /// verbatim so captures lose nothing the API sent.
    fn full_sync(&self) -> Result<String, BackendError>;

    /// Submit one command batch to the sync endpoint.
    fn apply_commands(&self, commands: &[SyncCommand]) -> Result<SyncResponse, BackendError>;
}
