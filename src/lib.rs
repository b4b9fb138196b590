//! # repofleet
//!
//! `repofleet` keeps a declared fleet of git working copies in the state a
//! YAML file describes. It powers the `repofleet` CLI tool.
//!
//! ## Core Features
//!
//! - **Declarative Targets**: Clone, update or delete working copies from one file.
//! - **Fetch Avoidance**: The remote is only contacted when local state cannot prove the pinned revision.
//! - **Safe Integration**: Fast-forward-only merges and explicit revision switches.
//! - **Bounded Concurrency**: A fixed worker pool with cooperative cancellation.
//! - **Untracked Audit**: Flags anything in a managed directory no target owns.
//!
//! ## Example
//!
//! ```rust,no_run
//! use repofleet::core::{RunPlan, RunStatistics, Scheduler};
//! use repofleet::git::{git_environment, ProcessRunner};
//! use repofleet::task::TaskSet;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let set = TaskSet::load(Path::new("repofleet.yaml"))?;
//!     let plan = RunPlan::new(&set, &[]);
//!     let scheduler = Scheduler::new(Arc::new(ProcessRunner), git_environment(), 5);
//!     let (_cancel, cancel_rx) = tokio::sync::watch::channel(false);
//!     let stats = Arc::new(RunStatistics::new());
//!     let report = scheduler.run(plan.selected, stats, cancel_rx, |_| {}).await;
//!     for outcome in report.outcomes {
//!         println!("{}", outcome.output());
//!     }
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod sync;
pub mod task;
pub mod utils;
