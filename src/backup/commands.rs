//! Snapshot payload structures and restore command builders.
//!
//! A capture's payload is parsed into [`Snapshot`]; `plan_restore` turns it
//! back into a creation command batch whose internal references are
//! rewritten from the original remote ids to fresh per-run temp ids. The
//! id and reference fields are typed; everything else is carried as opaque
//! JSON so a restore preserves whatever fields the capture recorded.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::backend::SyncCommand;

/// Deserialized subset of a full-sync payload.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub labels: Vec<SnapshotLabel>,
    #[serde(default)]
    pub projects: Vec<SnapshotProject>,
    #[serde(default)]
    pub sections: Vec<SnapshotSection>,
    #[serde(default)]
    pub items: Vec<SnapshotItem>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotLabel {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<Value>,
    #[serde(default)]
    pub item_order: Option<Value>,
    #[serde(default)]
    pub is_favorite: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotProject {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<Value>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub child_order: Option<Value>,
    #[serde(default)]
    pub is_favorite: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotSection {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub section_order: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotItem {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub section_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub due: Option<Value>,
    #[serde(default)]
    pub priority: Option<Value>,
    #[serde(default)]
    pub child_order: Option<Value>,
    #[serde(default)]
    pub day_order: Option<Value>,
    #[serde(default)]
    pub collapsed: Option<Value>,
    #[serde(default, deserialize_with = "de_id_list")]
    pub labels: Vec<String>,
}

/// Mapping from original remote ids to per-run temp ids.
///
/// An entry is written at most once per original id; looking up an
/// unmapped id yields `None`, since a reference can legitimately be null.
#[derive(Debug, Default)]
pub struct TempIdMap(HashMap<String, String>);

impl TempIdMap {
    /// Temp id for an entity being visited, generating one on first sight.
    pub fn assign(&mut self, original_id: &str) -> String {
        self.0
            .entry(original_id.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    pub fn resolve(&self, original_id: &str) -> Option<String> {
        self.0.get(original_id).cloned()
    }

    fn resolve_ref(&self, reference: &Option<String>) -> Option<String> {
        reference.as_deref().and_then(|id| self.resolve(id))
    }
}

/// Build the creation command batch for a snapshot in dependency order:
/// all labels, then projects, then sections, then items. The order
/// guarantees that every cross-reference is visited after the entity it
/// points at, so its temp id is already in the map.
pub fn plan_restore(snapshot: &Snapshot) -> Result<Vec<SyncCommand>, serde_json::Error> {
    let mut temp_ids = TempIdMap::default();
    let mut commands = Vec::with_capacity(
        snapshot.labels.len()
            + snapshot.projects.len()
            + snapshot.sections.len()
            + snapshot.items.len(),
    );

    for label in &snapshot.labels {
        commands.push(label_add(&mut temp_ids, label)?);
    }
    let projects = parents_first(&snapshot.projects, |p| p.id.as_str(), |p| p.parent_id.as_deref());
    for project in projects {
        commands.push(project_add(&mut temp_ids, project)?);
    }
    for section in &snapshot.sections {
        commands.push(section_add(&mut temp_ids, section)?);
    }
    let items = parents_first(&snapshot.items, |i| i.id.as_str(), |i| i.parent_id.as_deref());
    for item in items {
        commands.push(item_add(&mut temp_ids, item)?);
    }
    Ok(commands)
}

/// Order entries so that every entry's in-snapshot parent precedes it; the
/// payload itself does not guarantee this. Entries whose parent is absent
/// from the snapshot count as roots and keep their payload order.
fn parents_first<'s, T>(
    entries: &'s [T],
    id: impl Fn(&T) -> &str,
    parent: impl Fn(&T) -> Option<&str>,
) -> Vec<&'s T> {
    let known: HashSet<&str> = entries.iter().map(&id).collect();
    let mut children: HashMap<&str, Vec<&T>> = HashMap::new();
    let mut queue: VecDeque<&T> = VecDeque::new();
    for entry in entries {
        match parent(entry).filter(|p| known.contains(p)) {
            Some(p) => children.entry(p).or_default().push(entry),
            None => queue.push_back(entry),
        }
    }

    let mut ordered = Vec::with_capacity(entries.len());
    let mut placed = HashSet::with_capacity(entries.len());
    while let Some(entry) = queue.pop_front() {
        placed.insert(id(entry));
        ordered.push(entry);
        if let Some(kids) = children.remove(id(entry)) {
            queue.extend(kids);
        }
    }
    // Reference cycles cannot exist remotely; anything unreachable anyway
    // keeps its payload order rather than being dropped.
    for entry in entries {
        if !placed.contains(id(entry)) {
            ordered.push(entry);
        }
    }
    ordered
}

#[derive(Serialize)]
struct LabelAddArgs<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_order: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_favorite: Option<Value>,
}

fn label_add(temp_ids: &mut TempIdMap, label: &SnapshotLabel) -> Result<SyncCommand, serde_json::Error> {
    let temp_id = temp_ids.assign(&label.id);
    let args = serde_json::to_value(LabelAddArgs {
        name: &label.name,
        color: label.color.clone(),
        item_order: label.item_order.clone(),
        is_favorite: label.is_favorite.clone(),
    })?;
    Ok(SyncCommand::new("label_add", temp_id, args))
}

#[derive(Serialize)]
struct ProjectAddArgs<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    child_order: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_favorite: Option<Value>,
}

fn project_add(
    temp_ids: &mut TempIdMap,
    project: &SnapshotProject,
) -> Result<SyncCommand, serde_json::Error> {
    let parent_id = temp_ids.resolve_ref(&project.parent_id);
    let temp_id = temp_ids.assign(&project.id);
    let args = serde_json::to_value(ProjectAddArgs {
        name: &project.name,
        color: project.color.clone(),
        parent_id,
        child_order: project.child_order.clone(),
        is_favorite: project.is_favorite.clone(),
    })?;
    Ok(SyncCommand::new("project_add", temp_id, args))
}

#[derive(Serialize)]
struct SectionAddArgs<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section_order: Option<Value>,
}

fn section_add(
    temp_ids: &mut TempIdMap,
    section: &SnapshotSection,
) -> Result<SyncCommand, serde_json::Error> {
    let temp_id = temp_ids.assign(&section.id);
    let args = serde_json::to_value(SectionAddArgs {
        name: &section.name,
        project_id: temp_ids.resolve_ref(&section.project_id),
        section_order: section.section_order.clone(),
    })?;
    Ok(SyncCommand::new("section_add", temp_id, args))
}

#[derive(Serialize)]
struct ItemAddArgs<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    child_order: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    day_order: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collapsed: Option<Value>,
    labels: Vec<String>,
}

fn item_add(temp_ids: &mut TempIdMap, item: &SnapshotItem) -> Result<SyncCommand, serde_json::Error> {
    let temp_id = temp_ids.assign(&item.id);
    // Label ids were all mapped while processing the labels pass; a value
    // the map does not know (e.g. a label name from a newer payload
    // revision) passes through untouched.
    let labels = item
        .labels
        .iter()
        .map(|label| temp_ids.resolve(label).unwrap_or_else(|| label.clone()))
        .collect();
    let args = serde_json::to_value(ItemAddArgs {
        content: &item.content,
        description: item.description.clone(),
        project_id: temp_ids.resolve_ref(&item.project_id),
        section_id: temp_ids.resolve_ref(&item.section_id),
        parent_id: temp_ids.resolve_ref(&item.parent_id),
        due: item.due.clone(),
        priority: item.priority.clone(),
        child_order: item.child_order.clone(),
        day_order: item.day_order.clone(),
        collapsed: item.collapsed.clone(),
        labels,
    })?;
    Ok(SyncCommand::new("item_add", temp_id, args))
}

// Sync payloads have carried both numeric and string ids across API
// revisions; both deserialize to strings here.

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unsupported id value: {other}"
        ))),
    }
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "unsupported id value: {other}"
        ))),
    }
}

fn de_id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|value| match value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "unsupported id value: {other}"
            ))),
        })
        .collect()
}
