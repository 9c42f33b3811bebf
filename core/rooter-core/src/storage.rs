//! Storage paths for rooter data.
//!
//! Production code uses `StorageConfig::from_config()`, which honours
//! `datapath` and otherwise points at `<data dir>/rooter`. Tests use
//! `StorageConfig::with_root(temp_dir)` for isolation.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, RootError};

#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.datapath {
            Some(path) => Ok(Self::with_root(path.clone())),
            None => dirs::data_dir()
                .map(|dir| Self::with_root(dir.join("rooter")))
                .ok_or(RootError::HomeDirNotFound),
        }
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to project_history.json (recent project roots).
    pub fn history_file(&self) -> PathBuf {
        self.root.join("project_history.json")
    }
}
