//! Public API for the core module.
//!
//! This module provides the stable public API for run orchestration:
//! - Run planning and subset selection
//! - Bounded scheduling with cancellation
//! - Statistics, verdict and report rendering
//! - The untracked-path audit
//!
//! Internal implementation details are not exposed through this API.

// Planning
pub use super::plan::{check_requested, expected_children, AuditLayout, RunPlan};

// Scheduling
pub use super::scheduler::{interrupt_on_ctrl_c, RunReport, Scheduler};

// Results
pub use super::stats::{RunStatistics, Verdict};
pub use super::report::{render_outcome, should_display, summary_lines, untracked_lines};
pub use super::progress::RunProgress;

// Audit
pub use super::audit::find_untracked;

// Configuration
pub use super::config::{resolve_jobs, DEFAULT_CONFIG_FILE, DEFAULT_JOBS};
pub use super::config::TITLE_PREFIX;

// Terminal utilities (re-exported from utils)
pub use crate::utils::{set_terminal_title, set_terminal_title_and_flush};
