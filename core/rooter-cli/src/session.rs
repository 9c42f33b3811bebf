//! `rooter open` and `rooter history`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rooter_core::{
    load_config, BufferInfo, EnterOutcome, History, ProcessWorkingDirectory, ProjectSession, Result,
    RootChanged, RootError, RootObserver, RootOutcome, RootSource, StorageConfig,
};

const WALK_TIMEOUT: Duration = Duration::from_secs(30);

/// Prints a message on every root change unless `silent_chdir` is set.
struct MessageObserver;

impl RootObserver for MessageObserver {
    fn root_changed(&mut self, event: &RootChanged) {
        if event.silent {
            return;
        }
        let source = match &event.source {
            RootSource::Lsp { server } => format!("lsp {}", server),
            RootSource::Pattern { pattern } => format!("pattern {}", pattern),
            RootSource::Manual => "manual".to_string(),
        };
        eprintln!("rooter: root set to {} ({})", event.root.display(), source);
    }
}

/// Changes the process working directory as roots are found, so every
/// relative path is made absolute up front.
pub fn open(files: &[PathBuf], config: Option<&Path>) -> Result<bool> {
    let config = load_config(config)?;
    let storage = StorageConfig::from_config(&config)?;
    let storage = StorageConfig::with_root(absolute(storage.root()));
    let paths: Vec<PathBuf> = files
        .iter()
        .map(|file| fs_err::canonicalize(file).unwrap_or_else(|_| absolute(file)))
        .collect();

    let mut session = ProjectSession::new(config, &storage, Box::new(ProcessWorkingDirectory));
    session.add_observer(Box::new(MessageObserver));

    let mut any_root = false;
    for (index, path) in paths.into_iter().enumerate() {
        let buffer = BufferInfo::file(index as u64 + 1, &path, filetype_of(&path));

        let outcome = match session.buffer_entered(buffer)? {
            EnterOutcome::Pending(_) => session.wait_next(WALK_TIMEOUT)?,
            EnterOutcome::Applied(outcome) => Some(outcome),
            EnterOutcome::Skipped(reason) => {
                tracing::debug!(file = %path.display(), reason = ?reason, "Skipped");
                None
            }
            EnterOutcome::NoRoot => None,
        };

        match outcome {
            Some(RootOutcome::Changed(root)) | Some(RootOutcome::Unchanged(root)) => {
                any_root = true;
                println!("{}\t{}", path.display(), root.display());
            }
            Some(RootOutcome::Excluded(root)) => {
                println!("{}\t(excluded {})", path.display(), root.display());
            }
            _ => println!("{}\t-", path.display()),
        }
    }

    session.save_history()?;
    Ok(any_root)
}

pub fn history(json: bool, config: Option<&Path>) -> Result<bool> {
    let config = load_config(config)?;
    let storage = StorageConfig::from_config(&config)?;
    let history = History::load(storage.history_file(), config.history_size);
    let recent = history.recent_projects();

    if json {
        let value = serde_json::to_string_pretty(&recent).map_err(|e| RootError::Json {
            context: "Failed to serialize history".to_string(),
            source: e,
        })?;
        println!("{}", value);
    } else {
        for entry in &recent {
            println!("{}\t{}", entry.last_opened.to_rfc3339(), entry.path.display());
        }
    }
    Ok(true)
}

fn absolute(path: &Path) -> PathBuf {
    match std::env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    }
}

fn filetype_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_string()
}
