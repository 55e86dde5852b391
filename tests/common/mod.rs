//! In-memory backend double shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde_json::{json, Value};

use doistkit::backend::{
    Backend, BackendError, CreateLabelArgs, CreateProjectArgs, CreateSectionArgs, CreateTaskArgs,
    Due, Label, Project, Section, SyncCommand, SyncResponse, Task,
};

#[derive(Default)]
pub struct MockBackend {
    pub state: RefCell<State>,
    /// When set, `apply_commands` reports a rejected command.
    pub fail_commands: Cell<bool>,
}

#[derive(Default)]
pub struct State {
    pub projects: Vec<Project>,
    pub sections: Vec<Section>,
    pub labels: Vec<Label>,
    pub tasks: Vec<Task>,
    /// Remote writes performed through the `create_*` operations.
    pub creations: usize,
    next_id: usize,
}

impl State {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creations(&self) -> usize {
        self.state.borrow().creations
    }

    // Seeding helpers bypass the creation counter so tests can
    // distinguish pre-existing remote state from writes under test.

    pub fn seed_project(&self, name: &str) -> Project {
        let mut state = self.state.borrow_mut();
        let project = Project {
            id: state.fresh_id("p"),
            name: name.to_string(),
            color: None,
            is_favorite: false,
            order: 0,
            parent_id: None,
        };
        state.projects.push(project.clone());
        project
    }

    pub fn seed_section(&self, name: &str, project_id: &str) -> Section {
        let mut state = self.state.borrow_mut();
        let section = Section {
            id: state.fresh_id("s"),
            name: name.to_string(),
            project_id: project_id.to_string(),
            order: 0,
        };
        state.sections.push(section.clone());
        section
    }

    pub fn seed_label(&self, name: &str) -> Label {
        let mut state = self.state.borrow_mut();
        let label = Label {
            id: state.fresh_id("l"),
            name: name.to_string(),
            color: None,
            is_favorite: false,
            order: 0,
        };
        state.labels.push(label.clone());
        label
    }

    pub fn find_task(&self, content: &str) -> Option<Task> {
        self.state
            .borrow()
            .tasks
            .iter()
            .find(|task| task.content == content)
            .cloned()
    }
}

impl Backend for MockBackend {
    fn projects(&self) -> Result<Vec<Project>, BackendError> {
        Ok(self.state.borrow().projects.clone())
    }

    fn sections(&self) -> Result<Vec<Section>, BackendError> {
        Ok(self.state.borrow().sections.clone())
    }

    fn labels(&self) -> Result<Vec<Label>, BackendError> {
        Ok(self.state.borrow().labels.clone())
    }

    fn tasks(&self) -> Result<Vec<Task>, BackendError> {
        Ok(self.state.borrow().tasks.clone())
    }

    fn create_project(&self, args: &CreateProjectArgs) -> Result<Project, BackendError> {
        let mut state = self.state.borrow_mut();
        state.creations += 1;
        let project = Project {
            id: state.fresh_id("p"),
            name: args.name.clone(),
            color: args.color.clone(),
            is_favorite: args.favorite.unwrap_or(false),
            order: 0,
            parent_id: args.parent_id.clone(),
        };
        state.projects.push(project.clone());
        Ok(project)
    }

    fn create_section(&self, args: &CreateSectionArgs) -> Result<Section, BackendError> {
        let mut state = self.state.borrow_mut();
        state.creations += 1;
        let section = Section {
            id: state.fresh_id("s"),
            name: args.name.clone(),
            project_id: args.project_id.clone(),
            order: 0,
        };
        state.sections.push(section.clone());
        Ok(section)
    }

    fn create_label(&self, args: &CreateLabelArgs) -> Result<Label, BackendError> {
        let mut state = self.state.borrow_mut();
        state.creations += 1;
        let label = Label {
            id: state.fresh_id("l"),
            name: args.name.clone(),
            color: args.color.clone(),
            is_favorite: args.favorite.unwrap_or(false),
            order: 0,
        };
        state.labels.push(label.clone());
        Ok(label)
    }

    fn create_task(&self, args: &CreateTaskArgs) -> Result<Task, BackendError> {
        let mut state = self.state.borrow_mut();
        state.creations += 1;
        let due = if args.due_string.is_some() || args.due_date.is_some() || args.due_datetime.is_some()
        {
            Some(Due {
                string: args.due_string.clone(),
                date: args.due_date.clone(),
                datetime: args.due_datetime.clone(),
                is_recurring: args.due_string.is_some(),
                timezone: None,
            })
        } else {
            None
        };
        let task = Task {
            id: state.fresh_id("t"),
            content: args.content.clone(),
            description: args.description.clone(),
            is_completed: args.completed.unwrap_or(false),
            priority: args.priority,
            due,
            label_ids: args.label_ids.clone(),
            project_id: args.project_id.clone(),
            section_id: args.section_id.clone(),
            parent_id: args.parent_id.clone(),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    fn full_sync(&self) -> Result<String, BackendError> {
        let state = self.state.borrow();
        let labels: Vec<Value> = state
            .labels
            .iter()
            .map(|l| {
                json!({
                    "id": l.id,
                    "name": l.name,
                    "color": l.color,
                    "item_order": l.order,
                    "is_favorite": l.is_favorite,
                })
            })
            .collect();
        let projects: Vec<Value> = state
            .projects
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "color": p.color,
                    "parent_id": p.parent_id,
                    "child_order": p.order,
                    "is_favorite": p.is_favorite,
                })
            })
            .collect();
        let sections: Vec<Value> = state
            .sections
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "project_id": s.project_id,
                    "section_order": s.order,
                })
            })
            .collect();
        let items: Vec<Value> = state
            .tasks
            .iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "content": t.content,
                    "description": t.description,
                    "project_id": t.project_id,
                    "section_id": t.section_id,
                    "parent_id": t.parent_id,
                    "priority": t.priority,
                    "due": null,
                    "child_order": 0,
                    "labels": t.label_ids,
                })
            })
            .collect();
        Ok(json!({
            "labels": labels,
            "projects": projects,
            "sections": sections,
            "items": items,
        })
        .to_string())
    }

    fn apply_commands(&self, commands: &[SyncCommand]) -> Result<SyncResponse, BackendError> {
        if self.fail_commands.get() {
            let mut response = SyncResponse::default();
            if let Some(command) = commands.first() {
                response.sync_status.insert(
                    command.uuid.clone(),
                    json!({"error": "boom", "error_code": 42}),
                );
            }
            return Ok(response);
        }

        let mut temp_to_real: HashMap<String, String> = HashMap::new();
        let mut response = SyncResponse::default();
        for command in commands {
            let args = &command.args;
            let text = |key: &str| args.get(key).and_then(Value::as_str).map(str::to_string);
            let resolved = |key: &str| {
                text(key).map(|reference| {
                    temp_to_real
                        .get(&reference)
                        .cloned()
                        .unwrap_or(reference)
                })
            };

            let real_id = match command.kind.as_str() {
                "label_add" => {
                    let mut state = self.state.borrow_mut();
                    let label = Label {
                        id: state.fresh_id("L"),
                        name: text("name").unwrap_or_default(),
                        color: text("color"),
                        is_favorite: args
                            .get("is_favorite")
                            .and_then(Value::as_bool)
                            .unwrap_or(false),
                        order: 0,
                    };
                    let id = label.id.clone();
                    state.labels.push(label);
                    id
                }
                "project_add" => {
                    let parent_id = resolved("parent_id");
                    let mut state = self.state.borrow_mut();
                    let project = Project {
                        id: state.fresh_id("P"),
                        name: text("name").unwrap_or_default(),
                        color: text("color"),
                        is_favorite: args
                            .get("is_favorite")
                            .and_then(Value::as_bool)
                            .unwrap_or(false),
                        order: 0,
                        parent_id,
                    };
                    let id = project.id.clone();
                    state.projects.push(project);
                    id
                }
                "section_add" => {
                    let project_id = resolved("project_id").unwrap_or_default();
                    let mut state = self.state.borrow_mut();
                    let section = Section {
                        id: state.fresh_id("S"),
                        name: text("name").unwrap_or_default(),
                        project_id,
                        order: 0,
                    };
                    let id = section.id.clone();
                    state.sections.push(section);
                    id
                }
                "item_add" => {
                    let project_id = resolved("project_id");
                    let section_id = resolved("section_id");
                    let parent_id = resolved("parent_id");
                    let label_ids = args
                        .get("labels")
                        .and_then(Value::as_array)
                        .map(|labels| {
                            labels
                                .iter()
                                .filter_map(Value::as_str)
                                .map(|label| {
                                    temp_to_real
                                        .get(label)
                                        .cloned()
                                        .unwrap_or_else(|| label.to_string())
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    let mut state = self.state.borrow_mut();
                    let task = Task {
                        id: state.fresh_id("T"),
                        content: text("content").unwrap_or_default(),
                        description: text("description"),
                        is_completed: false,
                        priority: args
                            .get("priority")
                            .and_then(Value::as_u64)
                            .map(|p| p as u8),
                        due: None,
                        label_ids,
                        project_id,
                        section_id,
                        parent_id,
                    };
                    let id = task.id.clone();
                    state.tasks.push(task);
                    id
                }
                other => {
                    response.sync_status.insert(
                        command.uuid.clone(),
                        json!({"error": format!("unknown command {other}")}),
                    );
                    continue;
                }
            };

            temp_to_real.insert(command.temp_id.clone(), real_id.clone());
            response
                .sync_status
                .insert(command.uuid.clone(), Value::String("ok".to_string()));
            response
                .temp_id_mapping
                .insert(command.temp_id.clone(), real_id);
        }
        Ok(response)
    }
}
