//! Error types for rooter-core operations.
//!
//! The resolution core itself never fails: unreadable directories degrade to
//! empty listings and reaching the filesystem root is a normal outcome. These
//! variants cover the edges around it (worker submission, config, history).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RootError {
    // ─────────────────────────────────────────────────────────────────────
    // Dispatch Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to spawn resolver worker: {0}")]
    Spawn(#[source] std::io::Error),

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {details}")]
    ConfigParse { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Working Directory Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to change working directory to {path}: {source}")]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using RootError.
pub type Result<T> = std::result::Result<T, RootError>;

impl From<RootError> for String {
    fn from(err: RootError) -> String {
        err.to_string()
    }
}
