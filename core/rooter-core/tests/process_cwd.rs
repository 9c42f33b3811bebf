//! Session driving the real process working directory.
//!
//! Kept as the only test in this binary: it changes process-wide state.

use std::time::Duration;

use rooter_core::{
    BufferInfo, ChdirScope, Config, DetectionMethod, History, Pattern, ProcessWorkingDirectory,
    ProjectSession, RootOutcome, WorkingDirectory,
};
use tempfile::TempDir;

#[test]
fn test_session_changes_process_directory() {
    let original = std::env::current_dir().expect("current dir");
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let base = fs_err::canonicalize(tmp.path()).expect("canonicalize");
    let app = base.join("app");
    fs_err::create_dir_all(app.join("src")).expect("Failed to create dir");
    fs_err::write(app.join("Cargo.toml"), "").expect("Failed to create file");

    let config = Config {
        detection_methods: vec![DetectionMethod::Pattern],
        patterns: vec![Pattern::from("Cargo.toml")],
        ..Config::default()
    };
    let history = History::new(base.join("history.json"), 10);
    let mut session =
        ProjectSession::with_history(config, history, Box::new(ProcessWorkingDirectory));

    session
        .buffer_entered(BufferInfo::file(1, app.join("src/lib.rs"), "rust"))
        .expect("enter");
    let applied = session
        .wait_next(Duration::from_secs(10))
        .expect("apply")
        .expect("completion");

    assert_eq!(applied, RootOutcome::Changed(app.clone()));
    assert_eq!(std::env::current_dir().expect("current dir"), app);
    assert_eq!(session.current_dir(), Some(app));

    ProcessWorkingDirectory
        .change(&original, ChdirScope::Global)
        .expect("restore cwd");
}
