//! User configuration.
//!
//! Loaded from TOML (default `~/.config/rooter/config.toml`). Every field has a
//! default, so a missing file or a partial file is fine:
//!
//! ```toml
//! manual_mode = false
//! detection_methods = ["lsp", "pattern"]
//! patterns = [".git", "Makefile", "=src", "!>node_modules"]
//! ignore_lsp = ["efm"]
//! exclude_dirs = ["~/.cargo/*"]
//! silent_chdir = true
//! scope_chdir = "global"
//! history_size = 100
//! ```
//!
//! Only `patterns` reaches the resolution core; everything else is caller
//! policy used by [`ProjectSession`](crate::session::ProjectSession).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, RootError};
use crate::pattern::Pattern;

pub const DEFAULT_PATTERNS: &[&str] = &[
    ".git",
    "_darcs",
    ".hg",
    ".bzr",
    ".svn",
    "Makefile",
    "package.json",
];

pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// A way of finding the root, tried in configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Ask attached language servers for their workspace root.
    Lsp,
    /// Walk up the tree testing `patterns`.
    Pattern,
}

/// Which working directory the host should change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChdirScope {
    #[default]
    Global,
    Tab,
    Win,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Never resolve automatically; only explicit requests change the root.
    pub manual_mode: bool,
    pub detection_methods: Vec<DetectionMethod>,
    pub patterns: Vec<Pattern>,
    /// Language servers whose roots are ignored.
    pub ignore_lsp: Vec<String>,
    /// Roots that are never accepted. A trailing `/*` excludes everything below.
    pub exclude_dirs: Vec<String>,
    /// Suppress the "root changed" message observers would otherwise show.
    pub silent_chdir: bool,
    pub scope_chdir: ChdirScope,
    /// Where history is stored. Defaults to the platform data dir.
    pub datapath: Option<PathBuf>,
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manual_mode: false,
            detection_methods: vec![DetectionMethod::Lsp, DetectionMethod::Pattern],
            patterns: DEFAULT_PATTERNS.iter().map(|p| Pattern::from(*p)).collect(),
            ignore_lsp: Vec::new(),
            exclude_dirs: Vec::new(),
            silent_chdir: true,
            scope_chdir: ChdirScope::Global,
            datapath: None,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl Config {
    pub fn uses(&self, method: DetectionMethod) -> bool {
        self.detection_methods.contains(&method)
    }
}

/// Default config location: `<config dir>/rooter/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("rooter").join("config.toml"))
        .ok_or(RootError::HomeDirNotFound)
}

/// Loads config from `path`, or the default location when `None`.
/// A missing file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "Config not found; using defaults");
        return Ok(Config::default());
    }

    let content =
        fs_err::read_to_string(&config_path).map_err(|source| RootError::ConfigRead {
            path: config_path.clone(),
            source,
        })?;
    parse_config(&content).map_err(|details| RootError::ConfigParse {
        path: config_path,
        details,
    })
}

pub fn parse_config(content: &str) -> std::result::Result<Config, String> {
    toml::from_str::<Config>(content).map_err(|err| err.to_string())
}
