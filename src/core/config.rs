//! Configuration constants and settings

// Concurrency Configuration
//
// Target pipelines are I/O-bound (git over the network).
pub const DEFAULT_JOBS: usize = 5;

/// Determines the worker count from the `--jobs` value
///
/// Zero is treated as one so a run always makes progress.
pub fn resolve_jobs(jobs: Option<usize>) -> usize {
    jobs.unwrap_or(DEFAULT_JOBS).max(1)
}

// Configuration file lookup
pub const DEFAULT_CONFIG_FILE: &str = "repofleet.yaml";

// Progress bar configuration
pub const PROGRESS_TEMPLATE: &str = "{spinner} [{pos}/{len}] {wide_msg}";
pub const PROGRESS_TICK_MILLIS: u64 = 120;

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 50;
pub const TITLE_PREFIX: &str = "repofleet";

// Summary messages
pub const SUMMARY_FAILED: &str = "Failed.";
pub const SUMMARY_NOTHING_TO_DO: &str = "Nothing to do.";
pub const SUMMARY_SUCCESS: &str = "Success.";
pub const INTERRUPTED_MESSAGE: &str = "Interrupted.";
pub const UNTRACKED_HINT: &str =
    "Delete them or add them to 'ignore_untracked' in the 'options' section.";
