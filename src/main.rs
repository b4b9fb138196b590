//! repofleet: keep a fleet of git working copies in their declared state
//!
//! Reads one or more YAML files listing git targets and clones, updates or
//! deletes each working copy concurrently.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use repofleet::commands::{handle_sync_command, SyncOptions};
use repofleet::core::{resolve_jobs, DEFAULT_CONFIG_FILE};

/// Synchronize git working copies declared in a YAML file
#[derive(Parser)]
#[command(name = "repofleet", author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (repeatable)
    #[arg(short, long = "file", value_name = "FILE", env = "REPOFLEET_FILE")]
    files: Vec<PathBuf>,

    /// Only synchronize these destination paths
    #[arg(value_name = "PATH")]
    targets: Vec<PathBuf>,

    /// Run up to N targets in parallel
    #[arg(short, long, value_name = "N", env = "REPOFLEET_JOBS")]
    jobs: Option<usize>,

    /// Show unchanged targets and informational logs
    #[arg(short, long)]
    verbose: bool,

    /// Fail when a managed directory holds paths no target owns
    #[arg(short = 'u', long, env = "REPOFLEET_CHECK_UNTRACKED")]
    check_untracked: bool,
}

fn init_logging(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("info")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let files = if cli.files.is_empty() {
        vec![PathBuf::from(".").join(DEFAULT_CONFIG_FILE)]
    } else {
        cli.files
    };

    let options = SyncOptions {
        files,
        targets: cli.targets,
        jobs: resolve_jobs(cli.jobs),
        verbose: cli.verbose,
        check_untracked: cli.check_untracked,
    };

    match handle_sync_command(options).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}
