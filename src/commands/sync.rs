//! Fleet synchronization command implementation
//!
//! This module loads every requested configuration file up front, then runs
//! each file's targets through the scheduler and prints the verdict. The
//! untracked audit runs once, over all files, after every file succeeded.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::{
    check_requested, find_untracked, interrupt_on_ctrl_c, set_terminal_title,
    set_terminal_title_and_flush, summary_lines, untracked_lines, AuditLayout, RunPlan,
    RunProgress, RunStatistics, Scheduler, Verdict, TITLE_PREFIX,
};
use crate::git::{git_environment, CommandRunner, ProcessRunner};
use crate::task::{ensure_unique_paths, Task, TaskSet};
use crate::utils::{absolute_path, real_path};

/// Everything the sync command needs from the command line
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub files: Vec<PathBuf>,
    /// Subset of destination paths; empty runs every target
    pub targets: Vec<PathBuf>,
    pub jobs: usize,
    pub verbose: bool,
    pub check_untracked: bool,
}

/// Main handler for the sync command
///
/// Returns `false` when any file's run failed. Configuration errors are
/// returned before any target executes.
pub async fn handle_sync_command(options: SyncOptions) -> Result<bool> {
    set_terminal_title(&format!("🚀 {TITLE_PREFIX}"));

    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
    let sets = load_task_sets(&options.files, &cwd)?;
    let requested: Vec<PathBuf> = options
        .targets
        .iter()
        .map(|target| absolute_path(&cwd, target))
        .collect();
    check_requested(&sets, &requested)?;

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
    let success = run_task_sets(&sets, &requested, runner, &options, interrupt_on_ctrl_c()).await?;

    let title = if success { "✅" } else { "🔴" };
    set_terminal_title_and_flush(&format!("{title} {TITLE_PREFIX}"));
    Ok(success)
}

/// Loads every configuration file once, keyed by its resolved location
pub fn load_task_sets(files: &[PathBuf], cwd: &Path) -> Result<Vec<TaskSet>> {
    let mut seen = BTreeSet::new();
    let mut sets = Vec::with_capacity(files.len());
    for file in files {
        let absolute = absolute_path(cwd, file);
        if !seen.insert(real_path(&absolute)) {
            debug!(config = %absolute.display(), "configuration file already loaded");
            continue;
        }
        let set = TaskSet::load(&absolute)?;
        sets.push(set);
    }

    let tasks: Vec<Task> = sets.iter().flat_map(|set| set.tasks.iter().cloned()).collect();
    ensure_unique_paths(&tasks)?;
    Ok(sets)
}

/// Runs every file in order, then audits untracked paths across all of them
///
/// Stops after the file during which an interrupt arrived. Returns `false`
/// when any file failed or the audit found stray paths.
pub async fn run_task_sets(
    sets: &[TaskSet],
    requested: &[PathBuf],
    runner: Arc<dyn CommandRunner>,
    options: &SyncOptions,
    cancel: watch::Receiver<bool>,
) -> Result<bool> {
    let mut success = true;
    for set in sets {
        if !run_task_set(set, requested, Arc::clone(&runner), options, cancel.clone()).await? {
            success = false;
        }
        if *cancel.borrow() {
            return Ok(false);
        }
    }

    if success && options.check_untracked {
        success = audit_untracked(sets)?;
    }
    Ok(success)
}

/// Prints paths next to managed targets that no file accounts for
pub fn audit_untracked(sets: &[TaskSet]) -> Result<bool> {
    let layout = AuditLayout::new(sets);
    let untracked = find_untracked(&layout.expected_children, &layout.ignore)
        .context("Failed to audit untracked paths")?;
    if untracked.is_empty() {
        return Ok(true);
    }

    for line in untracked_lines(&untracked) {
        println!("{line}");
    }
    for line in summary_lines(&Verdict::Failed(Vec::new()), false) {
        println!("{line}");
    }
    Ok(false)
}

/// Runs one configuration file's targets and prints its outcomes
pub async fn run_task_set(
    set: &TaskSet,
    requested: &[PathBuf],
    runner: Arc<dyn CommandRunner>,
    options: &SyncOptions,
    cancel: watch::Receiver<bool>,
) -> Result<bool> {
    let plan = RunPlan::new(set, requested);
    if plan.is_empty() && !requested.is_empty() {
        debug!(config = %set.config_path.display(), "no requested target in this file");
        return Ok(true);
    }

    let scheduler = Scheduler::new(runner, git_environment(), options.jobs);
    info!(
        config = %set.config_path.display(),
        targets = plan.selected.len(),
        jobs = scheduler.jobs(),
        "running configuration"
    );

    let stats = Arc::new(RunStatistics::new());
    let progress = RunProgress::new(plan.selected.len(), options.verbose)?;
    let report = scheduler
        .run(plan.selected.clone(), Arc::clone(&stats), cancel, |outcome| {
            progress.report(outcome)
        })
        .await;
    progress.finish();

    let verdict = stats.verdict(report.interrupted);
    for line in summary_lines(&verdict, report.interrupted) {
        println!("{line}");
    }
    Ok(!verdict.is_failure())
}
