//! Rolling snapshot history
//!
//! The history is a single JSON array of snapshots, oldest first, rewritten in
//! full on every run. A file that cannot be read back as such an array is
//! treated as empty and replaced by the next successful save.

use crate::models::Snapshot;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flat-file store for the snapshot log
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the log. Never fails: missing or corrupt files give an empty log.
    pub fn load(&self) -> Vec<Snapshot> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history at {}, starting fresh", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read history {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match parse_history(&raw) {
            Ok(log) => log,
            Err(e) => {
                warn!(
                    "History {} is malformed, discarding it: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the stored log.
    ///
    /// Writes a sibling temp file and renames it into place, so readers see
    /// either the old log or the new one.
    pub fn save(&self, log: &[Snapshot]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_string_pretty(log).context("Failed to serialize history")?;

        let tmp = self.temp_path();
        fs::write(&tmp, body).with_context(|| format!("Failed to write {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to replace {}", self.path.display()));
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Parse a serialized log. Any malformed element rejects the whole log.
pub fn parse_history(raw: &str) -> serde_json::Result<Vec<Snapshot>> {
    serde_json::from_str(raw)
}

/// Append `snapshot` and drop the oldest entries until `len <= window`
pub fn append_and_trim(mut log: Vec<Snapshot>, snapshot: Snapshot, window: usize) -> Vec<Snapshot> {
    log.push(snapshot);
    if log.len() > window {
        let excess = log.len() - window;
        log.drain(..excess);
    }
    log
}
