//! Calendar-event import.
//!
//! Converts calendar events into task-creation payloads. A task's due
//! comes from the event's recurrence rule when it carries one, otherwise
//! from its start instant: an absolute date for all-day events, an
//! absolute date-time for the rest. Project and section references are
//! assigned only when the index lookup succeeds; the label is created on
//! first sight and memoized for the rest of the run.

pub mod calendar;

use std::path::Path;

use anyhow::{anyhow, Result};
use log::{debug, info};

use crate::backend::{Backend, CreateTaskArgs};
use crate::index::{ensure_label, EntityIndex};
use crate::rrule::RecurrenceRule;
use crate::utils::datetime::format_ymd;
use self::calendar::CalendarEvent;

pub struct IcsImporter<'a> {
    backend: &'a dyn Backend,
    index: EntityIndex,
}

impl<'a> IcsImporter<'a> {
    /// Fetch the current collections and build the lookup index.
    pub fn new(backend: &'a dyn Backend) -> Result<Self> {
        let index = EntityIndex::from_backend(backend)?;
        Ok(Self { backend, index })
    }

    /// Import every event of `path` as a task, returning how many were
    /// created. Without a resolvable project the tasks land in the Inbox.
    pub fn import(
        &mut self,
        path: &Path,
        project: Option<&str>,
        section: Option<&str>,
        label: Option<&str>,
    ) -> Result<usize> {
        let project_id = project
            .and_then(|name| self.index.project_id(name))
            .map(str::to_string);
        let section_id = section
            .and_then(|name| self.index.section_id_any(name))
            .map(str::to_string);
        let label_ids = self.label_ids(label)?;

        let mut created = 0;
        for event in calendar::read_events(path) {
            let (content, args) = self.event_to_task(
                &event,
                project_id.as_deref(),
                section_id.as_deref(),
                &label_ids,
            )?;
            info!("adding task {content}");
            debug!("{args:?}");
            self.backend.create_task(&args)?;
            created += 1;
        }
        Ok(created)
    }

    /// Build the creation payload for one event.
    pub fn event_to_task(
        &self,
        event: &CalendarEvent,
        project_id: Option<&str>,
        section_id: Option<&str>,
        label_ids: &[String],
    ) -> Result<(String, CreateTaskArgs)> {
        let mut args = CreateTaskArgs {
            description: event.description.clone(),
            completed: Some(false),
            label_ids: label_ids.to_vec(),
            ..Default::default()
        };
        args.place(project_id, section_id, None);

        if let Some(line) = event.property_line("RRULE") {
            let start = event
                .start_date()
                .ok_or_else(|| anyhow!("recurring event without a start date"))?;
            args.due_string = Some(RecurrenceRule::parse(start, line)?.to_string());
        } else if let Some(start) = event.start {
            if event.all_day {
                args.due_date = Some(format_ymd(start.date()));
            } else {
                args.due_datetime = Some(start.format("%Y-%m-%dT%H:%M:%S").to_string());
            }
        }

        let content = event.name.clone().unwrap_or_default();
        Ok((content, args))
    }

    /// Resolve the label to assign to every event, creating it remotely
    /// when it does not exist yet.
    fn label_ids(&mut self, label: Option<&str>) -> Result<Vec<String>> {
        match label {
            None => Ok(Vec::new()),
            Some(name) => Ok(vec![ensure_label(self.backend, &mut self.index, name)?]),
        }
    }
}
