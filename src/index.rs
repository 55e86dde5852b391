//! In-memory lookup index over the remote entity collections.
//!
//! Resolves a human-given name (optionally qualified by an owning project)
//! to a remote entity id. The index is built once from a bulk fetch;
//! `remember_*` keeps it current as the run creates entities, so later
//! lookups see them without a re-fetch. Lookups never touch the network.

use std::collections::HashMap;

use crate::backend::{Backend, BackendError, Label, Project, Section, Task};
use crate::utils::normalize::normalize;

#[derive(Debug, Default)]
pub struct EntityIndex {
    projects: HashMap<String, String>,
    sections: HashMap<(String, String), String>,
    labels: HashMap<String, String>,
    tasks: HashMap<(String, String), String>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from one bulk fetch per collection.
    pub fn from_backend(backend: &dyn Backend) -> Result<Self, BackendError> {
        let mut index = Self::new();
        for project in backend.projects()? {
            index.remember_project(&project);
        }
        for section in backend.sections()? {
            index.remember_section(&section);
        }
        for label in backend.labels()? {
            index.remember_label(&label);
        }
        for task in backend.tasks()? {
            index.remember_task(&task);
        }
        Ok(index)
    }

    pub fn project_id(&self, name: &str) -> Option<&str> {
        self.projects.get(&normalize(name)).map(String::as_str)
    }

    /// Section lookup scoped to its owning project.
    pub fn section_id(&self, name: &str, project_id: &str) -> Option<&str> {
        self.sections
            .get(&(normalize(name), project_id.to_string()))
            .map(String::as_str)
    }

    /// Unscoped section lookup; any project's section of that name
    /// matches. Used when the caller names a section without a project.
    pub fn section_id_any(&self, name: &str) -> Option<&str> {
        let wanted = normalize(name);
        self.sections
            .iter()
            .find(|((section, _), _)| *section == wanted)
            .map(|(_, id)| id.as_str())
    }

    pub fn label_id(&self, name: &str) -> Option<&str> {
        self.labels.get(&normalize(name)).map(String::as_str)
    }

    /// Task lookup scoped to the container the task lives in: its parent
    /// task, else its section, else its project. `scope` is empty for
    /// Inbox tasks.
    pub fn task_id(&self, content: &str, scope: &str) -> Option<&str> {
        self.tasks
            .get(&(normalize(content), scope.to_string()))
            .map(String::as_str)
    }

    // The first id registered under a key wins: one normalized key never
    // points at two different ids within a run.

    pub fn remember_project(&mut self, project: &Project) {
        self.projects
            .entry(normalize(&project.name))
            .or_insert_with(|| project.id.clone());
    }

    pub fn remember_section(&mut self, section: &Section) {
        self.sections
            .entry((normalize(&section.name), section.project_id.clone()))
            .or_insert_with(|| section.id.clone());
    }

    pub fn remember_label(&mut self, label: &Label) {
        self.labels
            .entry(normalize(&label.name))
            .or_insert_with(|| label.id.clone());
    }

    pub fn remember_task(&mut self, task: &Task) {
        let scope = task
            .parent_id
            .as_deref()
            .or(task.section_id.as_deref())
            .or(task.project_id.as_deref())
            .unwrap_or_default();
        self.tasks
            .entry((normalize(&task.content), scope.to_string()))
            .or_insert_with(|| task.id.clone());
    }
}

/// Look up a label id, creating and remembering the label when absent.
pub fn ensure_label(
    backend: &dyn Backend,
    index: &mut EntityIndex,
    name: &str,
) -> Result<String, BackendError> {
    if let Some(id) = index.label_id(name) {
        return Ok(id.to_string());
    }
    let label = backend.create_label(&crate::backend::CreateLabelArgs {
        name: name.to_string(),
        ..Default::default()
    })?;
    index.remember_label(&label);
    Ok(label.id)
}
