//! Most-recently-used project roots.
//!
//! Roots accepted during this process go into the session list; roots from
//! earlier processes are loaded from `project_history.json`. Both are merged
//! (newest first, deduplicated) when listing or saving.
//!
//! ## File format
//!
//! ```json
//! { "version": 1, "projects": [{ "path": "/code/app", "last_opened": "2026-01-01T00:00:00Z" }] }
//! ```
//!
//! A missing or malformed file loads as empty history.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RootError};

const HISTORY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub path: PathBuf,
    pub last_opened: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    #[serde(default)]
    projects: Vec<HistoryEntry>,
}

#[derive(Debug)]
pub struct History {
    file: PathBuf,
    max_entries: usize,
    session: Vec<HistoryEntry>,
    persisted: Vec<HistoryEntry>,
}

impl History {
    /// Creates an empty history backed by `file` without reading it.
    pub fn new(file: PathBuf, max_entries: usize) -> Self {
        Self {
            file,
            max_entries,
            session: Vec::new(),
            persisted: Vec::new(),
        }
    }

    /// Loads persisted entries from `file`, degrading to empty on any problem.
    pub fn load(file: PathBuf, max_entries: usize) -> Self {
        let persisted = read_history_file(&file);
        Self {
            persisted,
            ..Self::new(file, max_entries)
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Records an accepted root at the front of the session list.
    pub fn record(&mut self, path: &Path) {
        self.record_at(path, Utc::now());
    }

    pub fn record_at(&mut self, path: &Path, when: DateTime<Utc>) {
        self.session.retain(|entry| entry.path != path);
        self.session.insert(
            0,
            HistoryEntry {
                path: path.to_path_buf(),
                last_opened: when,
            },
        );
    }

    /// Roots accepted during this process, most recent first.
    pub fn session_entries(&self) -> &[HistoryEntry] {
        &self.session
    }

    /// Session and persisted entries merged, newest first, one per path,
    /// capped at `max_entries`.
    pub fn merged(&self) -> Vec<HistoryEntry> {
        let mut all: Vec<HistoryEntry> = self
            .session
            .iter()
            .chain(self.persisted.iter())
            .cloned()
            .collect();
        // Stable sort keeps session entries ahead of persisted ties.
        all.sort_by(|a, b| b.last_opened.cmp(&a.last_opened));

        let mut seen = HashSet::new();
        all.retain(|entry| seen.insert(entry.path.clone()));
        all.truncate(self.max_entries);
        all
    }

    /// Like `merged`, but only roots that still exist on disk.
    pub fn recent_projects(&self) -> Vec<HistoryEntry> {
        let mut entries = self.merged();
        entries.retain(|entry| entry.path.is_dir());
        entries
    }

    /// Writes the merged history atomically (temp file + rename).
    pub fn save(&self) -> Result<()> {
        let file = HistoryFile {
            version: HISTORY_VERSION,
            projects: self.merged(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|e| RootError::Json {
            context: "Failed to serialize project history".to_string(),
            source: e,
        })?;

        let dir = self.file.parent().unwrap_or_else(|| Path::new("."));
        fs_err::create_dir_all(dir).map_err(|e| RootError::Io {
            context: "Failed to create history directory".to_string(),
            source: e,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| RootError::Io {
            context: "Failed to create temp file".to_string(),
            source: e,
        })?;
        tmp.write_all(content.as_bytes()).map_err(|e| RootError::Io {
            context: "Failed to write temp file".to_string(),
            source: e,
        })?;
        tmp.flush().map_err(|e| RootError::Io {
            context: "Failed to flush temp file".to_string(),
            source: e,
        })?;
        tmp.persist(&self.file).map_err(|e| RootError::Io {
            context: format!("Failed to persist {}", self.file.display()),
            source: e.error,
        })?;

        tracing::debug!(
            path = %self.file.display(),
            entries = file.projects.len(),
            "Project history saved"
        );
        Ok(())
    }
}

fn read_history_file(path: &Path) -> Vec<HistoryEntry> {
    let content = match fs_err::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str::<HistoryFile>(&content) {
        Ok(file) if file.version == HISTORY_VERSION => file.projects,
        Ok(file) => {
            tracing::warn!(
                path = %path.display(),
                version = file.version,
                "Unsupported project history version; ignoring"
            );
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Malformed project history; ignoring");
            Vec::new()
        }
    }
}
