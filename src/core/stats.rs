//! Statistics tracking for a synchronization run

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::git::Status;
use crate::sync::Outcome;

/// Overall classification of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// At least one target errored; holds the failed paths when known
    Failed(Vec<PathBuf>),
    NothingToDo,
    Success,
}

impl Verdict {
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Failed(_))
    }
}

/// Counters shared by every worker of a run
///
/// Simple counters are atomics; the failure list stays behind a Mutex.
#[derive(Debug, Default)]
pub struct RunStatistics {
    pub changed: AtomicU64,
    pub unchanged: AtomicU64,
    pub failed: AtomicU64,
    failed_paths: Mutex<Vec<PathBuf>>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished outcome
    pub fn record(&self, outcome: &Outcome) {
        match outcome.status() {
            Status::Changed => {
                self.changed.fetch_add(1, Ordering::Relaxed);
            }
            Status::Unchanged => {
                self.unchanged.fetch_add(1, Ordering::Relaxed);
            }
            Status::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut guard) = self.failed_paths.lock() {
                    guard.push(outcome.path.clone());
                } else {
                    tracing::warn!(path = %outcome.path.display(), "failed to record failure");
                }
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.changed.load(Ordering::Relaxed)
            + self.unchanged.load(Ordering::Relaxed)
            + self.failed.load(Ordering::Relaxed)
    }

    /// Failed paths, sorted for a stable report
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        let mut paths = match self.failed_paths.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        paths.sort();
        paths
    }

    /// Classifies the run; `interrupted` forces a failure
    pub fn verdict(&self, interrupted: bool) -> Verdict {
        if interrupted || self.failed.load(Ordering::Relaxed) > 0 {
            Verdict::Failed(self.failed_paths())
        } else if self.changed.load(Ordering::Relaxed) == 0 {
            Verdict::NothingToDo
        } else {
            Verdict::Success
        }
    }
}
