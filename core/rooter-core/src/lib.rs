//! # rooter-core
//!
//! Finds the project root for a file by walking up its ancestor directories and
//! testing each against an ordered list of patterns (`.git`, `=src`, `^repos`,
//! `>lua`, `!=vendor`, ...).
//!
//! ## Layers
//!
//! - **Resolution core**: [`pattern`], [`cache`], [`walker`] do the walk;
//!   [`dispatch`] runs it on a worker thread and hands back results over a
//!   channel. No global state, no working-directory changes.
//! - **Caller layer**: [`session::ProjectSession`] applies results through a
//!   [`session::WorkingDirectory`] seam, with LSP lookup ([`lsp`]), history
//!   ([`history`]), and [`config`].
//!
//! ## Design Principles
//!
//! - **Non-blocking**: callers submit walks and poll for completions.
//! - **Graceful degradation**: unreadable directories are empty, missing files
//!   return defaults, never errors.
//! - **Last writer wins**: request ids increase monotonically; stale results
//!   are discarded by the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rooter_core::{resolve, Pattern};
//!
//! let patterns = vec![Pattern::from(".git"), Pattern::from("=src")];
//! if let Some(found) = resolve(std::path::Path::new("/code/app/src/bin"), &patterns) {
//!     println!("{} ({})", found.dir.display(), found.pattern);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod lsp;
pub mod paths;
pub mod pattern;
pub mod session;
pub mod storage;
pub mod walker;

pub use cache::ListingCache;
pub use config::{load_config, ChdirScope, Config, DetectionMethod};
pub use dispatch::{Completion, Dispatcher, RequestId};
pub use error::{Result, RootError};
pub use history::{History, HistoryEntry};
pub use lsp::{AttachedServers, BufferId, ServerInfo};
pub use pattern::{evaluate, Pattern, PatternKind};
pub use session::{
    BufferInfo, BufferKind, EnterOutcome, ProcessWorkingDirectory, ProjectSession, RootChanged,
    RootObserver, RootOutcome, RootSource, SkipReason, VirtualWorkingDirectory, WorkingDirectory,
};
pub use storage::StorageConfig;
pub use walker::{resolve, RootMatch, WalkState};
