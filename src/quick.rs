//! Quick task capture from standard input.
//!
//! Each non-empty line becomes one task; a tab splits content from
//! description. Placement and label resolution follow the same lookup
//! rules as the calendar importer.

use std::io::BufRead;

use anyhow::Result;
use log::{debug, info};

use crate::backend::{Backend, CreateTaskArgs};
use crate::index::{ensure_label, EntityIndex};

pub struct QuickCapture<'a> {
    backend: &'a dyn Backend,
    index: EntityIndex,
}

impl<'a> QuickCapture<'a> {
    pub fn new(backend: &'a dyn Backend) -> Result<Self> {
        let index = EntityIndex::from_backend(backend)?;
        Ok(Self { backend, index })
    }

    /// Create one task per non-empty line of `reader`, returning how many
    /// were created.
    pub fn import<R: BufRead>(
        &mut self,
        reader: R,
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
        let label_ids = match label {
            None => Vec::new(),
            Some(name) => vec![ensure_label(self.backend, &mut self.index, name)?],
        };

        let mut created = 0;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (content, description) = match line.split_once('\t') {
                Some((content, description)) => {
                    (content.to_string(), Some(description.to_string()))
                }
                None => (line.to_string(), None),
            };
            let mut args = CreateTaskArgs {
                content,
                description,
                label_ids: label_ids.clone(),
                ..Default::default()
            };
            args.place(project_id.as_deref(), section_id.as_deref(), None);
            info!("adding task {}", args.content);
            debug!("{args:?}");
            self.backend.create_task(&args)?;
            created += 1;
        }
        Ok(created)
    }
}
