//! Template materialization against the remote account.
//!
//! Walks a declarative project → section/task → subtask tree and ensures
//! every named node exists remotely, creating only what the entity index
//! cannot resolve. Every creation is preceded by an index lookup, so
//! re-running the same template against the same account creates nothing
//! the second time.

pub mod loader;

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use log::{debug, info};
use serde_yaml::Value;

use crate::backend::{Backend, CreateProjectArgs, CreateSectionArgs, CreateTaskArgs};
use crate::index::{ensure_label, EntityIndex};

/// Project-node keys that do not name a section.
const RESERVED_PROJECT_KEYS: &[&str] = &["color", "favorite", "tasks"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("placeholder '{0}' has no value")]
    MissingPlaceholder(String),

    #[error("unbalanced placeholder braces in '{0}'")]
    UnbalancedBraces(String),
}

/// Placeholder values supplied on the command line.
pub type Placeholders = HashMap<String, String>;

pub struct TemplateMaterializer<'a> {
    backend: &'a dyn Backend,
    index: EntityIndex,
}

impl<'a> TemplateMaterializer<'a> {
    /// Fetch the current collections and build the lookup index.
    pub fn new(backend: &'a dyn Backend) -> Result<Self> {
        let index = EntityIndex::from_backend(backend)?;
        Ok(Self { backend, index })
    }

    /// Materialize every top-level project of `template`.
    pub fn apply(&mut self, template: &Value, placeholders: Option<&Placeholders>) -> Result<()> {
        let Some(map) = template.as_mapping() else {
            bail!("template root must be a mapping of project names");
        };
        for (name, node) in map {
            let name = name
                .as_str()
                .ok_or_else(|| anyhow!("project name must be a string"))?;
            self.project(name, node, placeholders)?;
        }
        Ok(())
    }

    fn project(
        &mut self,
        name: &str,
        node: &Value,
        placeholders: Option<&Placeholders>,
    ) -> Result<()> {
        let existing = self.index.project_id(name).map(str::to_string);
        let project_id = match existing {
            Some(id) => id,
            None => {
                let args = CreateProjectArgs {
                    name: substitute(name, placeholders)?,
                    color: text_field(node, "color", placeholders)?,
                    favorite: bool_field(node, "favorite")?,
                    ..Default::default()
                };
                let project = self.backend.create_project(&args)?;
                self.index.remember_project(&project);
                project.id
            }
        };
        info!("project '{}' ({})", name, project_id);

        let Some(map) = node.as_mapping() else {
            return Ok(());
        };
        for (key, child) in map {
            let key = key
                .as_str()
                .ok_or_else(|| anyhow!("keys under project '{}' must be strings", name))?;
            if key == "tasks" {
                for task in sequence(child, "tasks")? {
                    self.task(Some(project_id.as_str()), None, None, task, placeholders)?;
                }
            } else if !RESERVED_PROJECT_KEYS.contains(&key) {
                self.section(&project_id, key, child, placeholders)?;
            }
        }
        Ok(())
    }

    fn section(
        &mut self,
        project_id: &str,
        name: &str,
        node: &Value,
        placeholders: Option<&Placeholders>,
    ) -> Result<()> {
        let existing = self.index.section_id(name, project_id).map(str::to_string);
        let section_id = match existing {
            Some(id) => id,
            None => {
                let args = CreateSectionArgs {
                    name: substitute(name, placeholders)?,
                    project_id: project_id.to_string(),
                };
                let section = self.backend.create_section(&args)?;
                self.index.remember_section(&section);
                section.id
            }
        };
        info!("section '{}' ({})", name, section_id);

        if let Some(tasks) = node.get("tasks") {
            for task in sequence(tasks, "tasks")? {
                self.task(None, Some(section_id.as_str()), None, task, placeholders)?;
            }
        }
        Ok(())
    }

    /// Materialize one task node; at most one placement reference is set,
    /// section winning over project, project over parent. A task whose
    /// content already exists in the same container is reused, not
    /// duplicated.
    fn task(
        &mut self,
        project_id: Option<&str>,
        section_id: Option<&str>,
        parent_id: Option<&str>,
        node: &Value,
        placeholders: Option<&Placeholders>,
    ) -> Result<String> {
        let content = text_field(node, "content", placeholders)?
            .ok_or_else(|| anyhow!("task node without 'content'"))?;

        let scope = section_id.or(project_id).or(parent_id).unwrap_or_default();
        let existing = self.index.task_id(&content, scope).map(str::to_string);
        let task_id = match existing {
            Some(id) => id,
            None => {
                let mut args = CreateTaskArgs {
                    content: content.clone(),
                    description: text_field(node, "description", placeholders)?,
                    completed: bool_field(node, "completed")?,
                    priority: priority_field(node)?,
                    due_string: text_field(node, "due_string", placeholders)?,
                    ..Default::default()
                };
                args.place(project_id, section_id, parent_id);

                if let Some(labels) = node.get("labels") {
                    for label in sequence(labels, "labels")? {
                        let name = label
                            .as_str()
                            .ok_or_else(|| anyhow!("label names must be strings"))?;
                        let name = substitute(name, placeholders)?;
                        args.label_ids
                            .push(ensure_label(self.backend, &mut self.index, &name)?);
                    }
                }

                let task = self.backend.create_task(&args)?;
                debug!("{:?}", args);
                self.index.remember_task(&task);
                task.id
            }
        };
        info!("task '{}' ({})", content, task_id);

        if let Some(subtasks) = node.get("tasks") {
            for subtask in sequence(subtasks, "tasks")? {
                self.task(None, None, Some(task_id.as_str()), subtask, placeholders)?;
            }
        }
        Ok(task_id)
    }
}

/// Render `{name}` placeholders against the supplied mapping. Without a
/// mapping the text passes through unchanged; with one, a referenced key
/// that has no value is a fatal error rather than literal output. `{{` and
/// `}}` escape literal braces.
pub fn substitute(text: &str, placeholders: Option<&Placeholders>) -> Result<String, TemplateError> {
    let Some(values) = placeholders else {
        return Ok(text.to_string());
    };
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => key.push(c),
                        None => return Err(TemplateError::UnbalancedBraces(text.to_string())),
                    }
                }
                let value = values
                    .get(&key)
                    .ok_or(TemplateError::MissingPlaceholder(key))?;
                out.push_str(value);
            }
            '}' => return Err(TemplateError::UnbalancedBraces(text.to_string())),
            c => out.push(c),
        }
    }
    Ok(out)
}

fn sequence<'v>(value: &'v Value, key: &str) -> Result<&'v Vec<Value>> {
    value
        .as_sequence()
        .ok_or_else(|| anyhow!("'{}' must be a sequence", key))
}

fn text_field(
    node: &Value,
    key: &str,
    placeholders: Option<&Placeholders>,
) -> Result<Option<String>> {
    match node.get(key) {
        None => Ok(None),
        Some(value) => {
            let text = value
                .as_str()
                .ok_or_else(|| anyhow!("'{}' must be a string", key))?;
            Ok(Some(substitute(text, placeholders)?))
        }
    }
}

fn bool_field(node: &Value, key: &str) -> Result<Option<bool>> {
    match node.get(key) {
        None => Ok(None),
        Some(value) => Ok(Some(
            value
                .as_bool()
                .ok_or_else(|| anyhow!("'{}' must be a boolean", key))?,
        )),
    }
}

fn priority_field(node: &Value) -> Result<Option<u8>> {
    match node.get("priority") {
        None => Ok(None),
        Some(value) => {
            let priority = value
                .as_u64()
                .filter(|p| (1..=4).contains(p))
                .ok_or_else(|| anyhow!("'priority' must be an integer between 1 and 4"))?;
            Ok(Some(priority as u8))
        }
    }
}
