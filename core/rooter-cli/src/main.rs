//! rooter: find the project root for a file.
//!
//! ## Subcommands
//!
//! - `resolve`: walk up from a path and print the root and the matching pattern
//! - `check`: test one pattern against one directory
//! - `open`: drive a project session over a list of files, recording history
//! - `history`: list recently used project roots

mod logging;
mod resolve;
mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rooter")]
#[command(about = "Find the project root for a file")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/rooter/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the project root for a file or directory
    Resolve {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Pattern to test, in priority order (repeatable; overrides config)
        #[arg(short, long = "pattern", value_name = "PATTERN")]
        patterns: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate one pattern against one directory
    Check {
        #[arg(value_name = "PATTERN", allow_hyphen_values = true)]
        pattern: String,

        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Enter each file in turn as a session would, changing root as needed
    Open {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// List recently used project roots
    History {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Resolve {
            path,
            patterns,
            json,
        } => resolve::run(&path, patterns, json, config_path),
        Commands::Check { pattern, dir } => Ok(resolve::check(&pattern, &dir)),
        Commands::Open { files } => session::open(&files, config_path),
        Commands::History { json } => session::history(json, config_path),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!(error = %e, "rooter failed");
            std::process::exit(2);
        }
    }
}
