//! Account snapshot capture and restore.
//!
//! Capture stores the full-sync payload verbatim, gzip-compressed, under a
//! timestamped filename; it never writes remote state. Restore replays a
//! capture as a single command batch (built by [`commands::plan_restore`])
//! against the sync endpoint — the batch either applies or the run fails,
//! with no partial-application recovery.

pub mod commands;

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};

use crate::backend::Backend;
use crate::utils::datetime::BACKUP_STAMP_FORMAT;
use self::commands::{plan_restore, Snapshot};

pub struct BackupService<'a> {
    backend: &'a dyn Backend,
}

impl<'a> BackupService<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Capture the account into `<base>-<timestamp>.bak.gz` and return the
    /// written path.
    pub fn backup(&self, base: &str) -> Result<PathBuf> {
        let payload = self.backend.full_sync()?;
        let stamp = Local::now().format(BACKUP_STAMP_FORMAT);
        let path = PathBuf::from(format!("{base}-{stamp}.bak.gz"));
        write_compressed(&path, payload.as_bytes())?;
        Ok(path)
    }

    /// Replay a capture into the account as one command batch.
    pub fn restore(&self, file: &Path) -> Result<()> {
        let payload = read_compressed(file)?;
        let snapshot: Snapshot =
            serde_json::from_str(&payload).context("malformed snapshot payload")?;
        let commands = plan_restore(&snapshot)?;
        info!(
            "restoring {} labels, {} projects, {} sections, {} tasks",
            snapshot.labels.len(),
            snapshot.projects.len(),
            snapshot.sections.len(),
            snapshot.items.len()
        );
        let response = self.backend.apply_commands(&commands)?;
        if let Some((uuid, detail)) = response.first_error() {
            bail!("restore command {uuid} rejected: {detail}");
        }
        Ok(())
    }
}

fn write_compressed(path: &Path, bytes: &[u8]) -> Result<()> {
    info!("write to {}", path.display());
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()?;
    debug!("wrote {} bytes", bytes.len());
    Ok(())
}

fn read_compressed(path: &Path) -> Result<String> {
    info!("read from {}", path.display());
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut payload = String::new();
    GzDecoder::new(file)
        .read_to_string(&mut payload)
        .with_context(|| format!("cannot decompress {}", path.display()))?;
    debug!("read {} bytes", payload.len());
    Ok(payload)
}
