//! `rooter resolve` and `rooter check`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rooter_core::paths::start_dir_for;
use rooter_core::{evaluate, load_config, Dispatcher, ListingCache, Pattern, Result};

/// Upper bound on a single walk; only reached on a hung filesystem.
const WALK_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns Ok(false) when no root was found.
pub fn run(path: &Path, patterns: Vec<String>, json: bool, config: Option<&Path>) -> Result<bool> {
    let patterns: Arc<[Pattern]> = if patterns.is_empty() {
        load_config(config)?.patterns.into()
    } else {
        patterns.into_iter().map(Pattern::from).collect()
    };

    let path = fs_err::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let Some(start) = start_dir_for(&path) else {
        tracing::warn!(path = %path.display(), "No directory to start from");
        return Ok(false);
    };

    let dispatcher = Dispatcher::new();
    let id = dispatcher.submit(start, patterns)?;
    let Some(completion) = dispatcher.recv_timeout(WALK_TIMEOUT) else {
        tracing::warn!(request_id = id.value(), "Root walk timed out");
        return Ok(false);
    };

    if json {
        let value = serde_json::json!({
            "start": completion.start_dir,
            "root": completion.outcome.as_ref().map(|m| &m.dir),
            "pattern": completion.outcome.as_ref().map(|m| m.pattern.as_str()),
        });
        println!("{}", value);
    } else if let Some(found) = &completion.outcome {
        println!("{}\t{}", found.dir.display(), found.pattern);
    }

    Ok(completion.outcome.is_some())
}

pub fn check(pattern: &str, dir: &Path) -> bool {
    let matched = evaluate(pattern, dir, &mut ListingCache::new());
    println!("{}", matched);
    matched
}
