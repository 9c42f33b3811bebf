//! Caller-side driver that turns resolved roots into working-directory changes.
//!
//! `ProjectSession` is what a host (editor, shell integration, the `rooter`
//! binary) holds for its lifetime. It decides *whether* to resolve, tries the
//! configured strategies in order, hands pattern walks to the background
//! [`Dispatcher`], and applies results from the host's own thread:
//!
//! 1. `buffer_entered` runs policy checks, then the LSP lookup (synchronous),
//!    then submits a pattern walk if nothing earlier produced a root.
//! 2. `poll` / `wait_next` receive finished walks. Only the newest request is
//!    authoritative; anything older is discarded as stale.
//! 3. `set_root` filters excluded roots, changes the working directory through
//!    the [`WorkingDirectory`] seam when it differs, records history, and
//!    notifies every registered [`RootObserver`].
//!
//! The host calls `server_attached` whenever a language server attaches; the
//! session re-resolves if LSP detection is configured.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ChdirScope, Config, DetectionMethod};
use crate::dispatch::{Completion, Dispatcher, RequestId};
use crate::error::{Result, RootError};
use crate::history::History;
use crate::lsp::{AttachedServers, BufferId, ServerInfo};
use crate::paths::{file_start_dir, is_excluded};
use crate::pattern::Pattern;
use crate::storage::StorageConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// Host Seams
// ═══════════════════════════════════════════════════════════════════════════════

/// The host's working directory. The session never touches process state
/// directly; it goes through this trait.
pub trait WorkingDirectory {
    fn current(&self, scope: ChdirScope) -> Option<PathBuf>;
    fn change(&mut self, dir: &Path, scope: ChdirScope) -> Result<()>;
}

/// Receives every root change (file-explorer sync, status messages, ...).
pub trait RootObserver {
    fn root_changed(&mut self, event: &RootChanged);
}

/// A working directory per scope kept in memory. Hosts that track their own
/// directories (editors with per-tab cwds) use this instead of the process cwd.
#[derive(Debug, Default, Clone)]
pub struct VirtualWorkingDirectory {
    dirs: HashMap<ChdirScope, PathBuf>,
}

impl VirtualWorkingDirectory {
    pub fn new(initial: Option<PathBuf>) -> Self {
        let mut dirs = HashMap::new();
        if let Some(dir) = initial {
            dirs.insert(ChdirScope::Global, dir);
        }
        Self { dirs }
    }
}

impl WorkingDirectory for VirtualWorkingDirectory {
    /// Tab and window scopes fall back to the global directory until set.
    fn current(&self, scope: ChdirScope) -> Option<PathBuf> {
        self.dirs
            .get(&scope)
            .or_else(|| self.dirs.get(&ChdirScope::Global))
            .cloned()
    }

    fn change(&mut self, dir: &Path, scope: ChdirScope) -> Result<()> {
        self.dirs.insert(scope, dir.to_path_buf());
        Ok(())
    }
}

/// The process working directory. There is only one, so every scope maps to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessWorkingDirectory;

impl WorkingDirectory for ProcessWorkingDirectory {
    fn current(&self, _scope: ChdirScope) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }

    fn change(&mut self, dir: &Path, _scope: ChdirScope) -> Result<()> {
        std::env::set_current_dir(dir).map_err(|source| RootError::WorkingDirectory {
            path: dir.to_path_buf(),
            source,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Session Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// A regular file on disk.
    File,
    /// Terminals, help pages, scratch buffers, prompts.
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferInfo {
    pub id: BufferId,
    pub path: Option<PathBuf>,
    pub filetype: String,
    pub kind: BufferKind,
}

impl BufferInfo {
    pub fn file(id: BufferId, path: impl Into<PathBuf>, filetype: impl Into<String>) -> Self {
        Self {
            id,
            path: Some(path.into()),
            filetype: filetype.into(),
            kind: BufferKind::File,
        }
    }
}

/// Which strategy produced a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    Lsp { server: String },
    Pattern { pattern: Pattern },
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootChanged {
    pub root: PathBuf,
    pub previous: Option<PathBuf>,
    pub source: RootSource,
    pub scope: ChdirScope,
    /// Observers that show messages should stay quiet when set.
    pub silent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ManualMode,
    NotAFile,
    NoPath,
}

/// What `buffer_entered` / `resolve_now` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    Skipped(SkipReason),
    /// An LSP root was found and applied synchronously.
    Applied(RootOutcome),
    /// A pattern walk is running; its completion carries this id.
    Pending(RequestId),
    /// No configured strategy produced a root.
    NoRoot,
}

/// Result of trying to apply a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootOutcome {
    /// A newer request superseded this one.
    Stale,
    /// The walk reached the filesystem root without a match.
    NotFound,
    /// The root is listed in `exclude_dirs`.
    Excluded(PathBuf),
    /// The working directory already was the root.
    Unchanged(PathBuf),
    Changed(PathBuf),
}

// ═══════════════════════════════════════════════════════════════════════════════
// ProjectSession
// ═══════════════════════════════════════════════════════════════════════════════

pub struct ProjectSession {
    config: Config,
    patterns: Arc<[Pattern]>,
    /// Set once at construction: re-resolve when servers attach.
    lsp_attach_hook: bool,
    dispatcher: Dispatcher,
    latest_request: Option<RequestId>,
    current_buffer: Option<BufferInfo>,
    servers: AttachedServers,
    cwd: Box<dyn WorkingDirectory>,
    observers: Vec<Box<dyn RootObserver>>,
    history: History,
}

impl ProjectSession {
    /// Creates a session, loading persisted history from `storage`.
    pub fn new(config: Config, storage: &StorageConfig, cwd: Box<dyn WorkingDirectory>) -> Self {
        let history = History::load(storage.history_file(), config.history_size);
        Self::with_history(config, history, cwd)
    }

    pub fn with_history(config: Config, history: History, cwd: Box<dyn WorkingDirectory>) -> Self {
        let patterns: Arc<[Pattern]> = config.patterns.iter().cloned().collect();
        let lsp_attach_hook = config.uses(DetectionMethod::Lsp);
        Self {
            config,
            patterns,
            lsp_attach_hook,
            dispatcher: Dispatcher::new(),
            latest_request: None,
            current_buffer: None,
            servers: AttachedServers::new(),
            cwd,
            observers: Vec::new(),
            history,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn lsp_attach_hook(&self) -> bool {
        self.lsp_attach_hook
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest_request
    }

    pub fn current_dir(&self) -> Option<PathBuf> {
        self.cwd.current(self.config.scope_chdir)
    }

    pub fn add_observer(&mut self, observer: Box<dyn RootObserver>) {
        self.observers.push(observer);
    }

    /// Host notification that `buffer` became the current buffer.
    pub fn buffer_entered(&mut self, buffer: BufferInfo) -> Result<EnterOutcome> {
        self.current_buffer = Some(buffer);
        if self.config.manual_mode {
            return Ok(EnterOutcome::Skipped(SkipReason::ManualMode));
        }
        self.resolve_now()
    }

    /// Host notification that `buffer` was closed. Pending walks for it become stale.
    pub fn buffer_closed(&mut self, buffer: BufferId) {
        self.servers.forget_buffer(buffer);
        if self.current_buffer.as_ref().is_some_and(|b| b.id == buffer) {
            self.current_buffer = None;
            self.latest_request = None;
        }
    }

    /// Host notification that a language server attached to `buffer`.
    ///
    /// Re-resolves when LSP detection is configured and `buffer` is current
    /// (unless in manual mode). Returns `None` when nothing was re-resolved.
    pub fn server_attached(
        &mut self,
        buffer: BufferId,
        server: ServerInfo,
    ) -> Result<Option<EnterOutcome>> {
        tracing::debug!(buffer, server = %server.name, "Language server attached");
        self.servers.attach(buffer, server);

        let is_current = self.current_buffer.as_ref().is_some_and(|b| b.id == buffer);
        if !self.lsp_attach_hook || !is_current || self.config.manual_mode {
            return Ok(None);
        }
        self.resolve_now().map(Some)
    }

    pub fn server_detached(&mut self, buffer: BufferId, name: &str) {
        self.servers.detach(buffer, name);
    }

    /// Resolves the root for the current buffer, regardless of manual mode.
    pub fn resolve_now(&mut self) -> Result<EnterOutcome> {
        let Some(buffer) = self.current_buffer.clone() else {
            return Ok(EnterOutcome::Skipped(SkipReason::NoPath));
        };
        if buffer.kind != BufferKind::File {
            return Ok(EnterOutcome::Skipped(SkipReason::NotAFile));
        }
        let Some(path) = buffer.path.as_deref() else {
            return Ok(EnterOutcome::Skipped(SkipReason::NoPath));
        };

        let methods = self.config.detection_methods.clone();
        for method in methods {
            match method {
                DetectionMethod::Lsp => {
                    let found =
                        self.servers
                            .lsp_root(buffer.id, &buffer.filetype, &self.config.ignore_lsp);
                    if let Some((root, server)) = found {
                        // Any walk still running is superseded.
                        self.latest_request = None;
                        let outcome = self.set_root(&root, RootSource::Lsp { server })?;
                        return Ok(EnterOutcome::Applied(outcome));
                    }
                }
                DetectionMethod::Pattern => {
                    // Buffers are files; no stat on the caller's thread.
                    let Some(start) = file_start_dir(path) else {
                        continue;
                    };
                    let id = self.dispatcher.submit(start, Arc::clone(&self.patterns))?;
                    self.latest_request = Some(id);
                    return Ok(EnterOutcome::Pending(id));
                }
            }
        }
        Ok(EnterOutcome::NoRoot)
    }

    /// Applies every walk that has finished, without blocking.
    pub fn poll(&mut self) -> Result<Vec<RootOutcome>> {
        self.dispatcher
            .drain()
            .into_iter()
            .map(|completion| self.handle_completion(completion))
            .collect()
    }

    /// Waits up to `timeout` for the next finished walk and applies it.
    pub fn wait_next(&mut self, timeout: Duration) -> Result<Option<RootOutcome>> {
        match self.dispatcher.recv_timeout(timeout) {
            Some(completion) => self.handle_completion(completion).map(Some),
            None => Ok(None),
        }
    }

    fn handle_completion(&mut self, completion: Completion) -> Result<RootOutcome> {
        if self.latest_request != Some(completion.id) {
            tracing::debug!(
                request_id = completion.id.value(),
                latest = ?self.latest_request.map(RequestId::value),
                "Discarding stale root walk"
            );
            return Ok(RootOutcome::Stale);
        }
        self.latest_request = None;

        match completion.outcome {
            Some(found) => self.set_root(
                &found.dir,
                RootSource::Pattern {
                    pattern: found.pattern,
                },
            ),
            None => {
                tracing::debug!(start = %completion.start_dir.display(), "No project root found");
                Ok(RootOutcome::NotFound)
            }
        }
    }

    /// Makes `root` the working directory if it is not excluded and differs
    /// from the current one.
    pub fn set_root(&mut self, root: &Path, source: RootSource) -> Result<RootOutcome> {
        if is_excluded(root, &self.config.exclude_dirs) {
            tracing::debug!(root = %root.display(), "Root is excluded");
            return Ok(RootOutcome::Excluded(root.to_path_buf()));
        }

        self.history.record(root);

        let scope = self.config.scope_chdir;
        let previous = self.cwd.current(scope);
        if previous.as_deref() == Some(root) {
            return Ok(RootOutcome::Unchanged(root.to_path_buf()));
        }

        self.cwd.change(root, scope)?;
        tracing::info!(
            root = %root.display(),
            source = ?source,
            scope = ?scope,
            "Project root changed"
        );

        let event = RootChanged {
            root: root.to_path_buf(),
            previous,
            source,
            scope,
            silent: self.config.silent_chdir,
        };
        for observer in &mut self.observers {
            observer.root_changed(&event);
        }
        Ok(RootOutcome::Changed(root.to_path_buf()))
    }

    /// Persists history (session roots merged with what was loaded).
    pub fn save_history(&self) -> Result<()> {
        self.history.save()
    }
}

impl std::fmt::Debug for ProjectSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectSession")
            .field("config", &self.config)
            .field("lsp_attach_hook", &self.lsp_attach_hook)
            .field("latest_request", &self.latest_request)
            .field("current_buffer", &self.current_buffer)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
