//! Logging setup for the rooter binary.
//!
//! Stderr output filtered by `ROOTER_LOG` (falling back to `RUST_LOG`, then
//! `warn`). `ROOTER_DEBUG_LOG=1` forces `debug`. When `ROOTER_LOG_DIR` is set,
//! logs also go to a daily-rolling file there; the returned guard must be held
//! until exit so buffered lines are flushed.

use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "rooter.log";

pub fn init() -> Option<WorkerGuard> {
    let filter = build_filter();

    match env::var_os("ROOTER_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(file_writer))
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn build_filter() -> EnvFilter {
    let debug_enabled = env::var("ROOTER_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env("ROOTER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}
