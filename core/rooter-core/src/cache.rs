//! Single-slot memo of the most recently scanned directory.
//!
//! The walk only ever looks at one directory per step, but several entry
//! patterns may be tested against it, so remembering the last listing is
//! enough to avoid repeated scans.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ListingCache {
    last_scanned_dir: Option<PathBuf>,
    entries: Vec<OsString>,
    scans: usize,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `dir` has a direct child entry named exactly `name`.
    ///
    /// Rescans when the cache holds a different directory (or nothing).
    pub fn contains(&mut self, dir: &Path, name: &str) -> bool {
        self.ensure(dir);
        let name = OsStr::new(name);
        self.entries.iter().any(|entry| entry == name)
    }

    /// The directory whose listing is currently held, if any.
    pub fn cached_dir(&self) -> Option<&Path> {
        self.last_scanned_dir.as_deref()
    }

    /// Number of directory scans performed over the lifetime of this cache.
    pub fn scans(&self) -> usize {
        self.scans
    }

    fn ensure(&mut self, dir: &Path) {
        if self.last_scanned_dir.as_deref() == Some(dir) {
            return;
        }
        self.entries = scan_dir(dir);
        self.last_scanned_dir = Some(dir.to_path_buf());
        self.scans += 1;
    }
}

/// Lists the names of `dir`'s immediate children.
/// Unreadable or missing directories yield an empty listing.
fn scan_dir(dir: &Path) -> Vec<OsString> {
    match fs_err::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name())
            .collect(),
        Err(err) => {
            tracing::trace!(path = %dir.display(), error = %err, "Directory scan failed; treating as empty");
            Vec::new()
        }
    }
}
