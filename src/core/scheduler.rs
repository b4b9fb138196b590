//! Bounded fan-out of target pipelines
//!
//! A producer task acquires one semaphore permit per target before spawning
//! its pipeline into a `JoinSet`, so at most `jobs` pipelines run at once.
//! Finished outcomes travel over an mpsc channel to the caller in completion
//! order. Cancellation aborts the producer, which drops the `JoinSet` and
//! with it every in-flight pipeline; outcomes already sent are still
//! delivered.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::stats::RunStatistics;
use crate::git::{CommandRunner, EnvMap};
use crate::sync::{Outcome, SyncEngine};
use crate::task::Task;

/// Everything the scheduler observed during one run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Outcomes in completion order
    pub outcomes: Vec<Outcome>,
    /// Set when the run was cancelled before every target finished
    pub interrupted: bool,
}

pub struct Scheduler {
    runner: Arc<dyn CommandRunner>,
    env: EnvMap,
    jobs: usize,
}

impl Scheduler {
    pub fn new(runner: Arc<dyn CommandRunner>, env: EnvMap, jobs: usize) -> Self {
        Self {
            runner,
            env,
            jobs: jobs.max(1),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Runs every task and reports outcomes as they complete
    ///
    /// `on_outcome` is called once per delivered outcome, before it is
    /// stored in the report. Statistics are updated by the workers.
    pub async fn run<F>(
        &self,
        tasks: Vec<Task>,
        stats: Arc<RunStatistics>,
        mut cancel: watch::Receiver<bool>,
        mut on_outcome: F,
    ) -> RunReport
    where
        F: FnMut(&Outcome),
    {
        let mut report = RunReport::default();
        if *cancel.borrow() {
            report.interrupted = true;
            return report;
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
        let producer = self.spawn_producer(tasks, stats, tx);

        let mut watching = true;
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(outcome) => {
                        on_outcome(&outcome);
                        report.outcomes.push(outcome);
                    }
                    None => break,
                },
                changed = cancel.changed(), if watching => {
                    if changed.is_err() {
                        // Nobody can cancel any more
                        watching = false;
                    } else if *cancel.borrow() {
                        report.interrupted = true;
                        break;
                    }
                }
            }
        }

        if report.interrupted {
            warn!("run interrupted, abandoning in-flight targets");
            producer.abort();
        }
        if let Err(err) = producer.await {
            if err.is_panic() {
                warn!("scheduler producer panicked");
                report.interrupted = true;
            }
        }

        // Outcomes that completed before the abort are still reported
        rx.close();
        while let Ok(outcome) = rx.try_recv() {
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }
        report
    }

    fn spawn_producer(
        &self,
        tasks: Vec<Task>,
        stats: Arc<RunStatistics>,
        tx: mpsc::UnboundedSender<Outcome>,
    ) -> tokio::task::JoinHandle<()> {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let runner = Arc::clone(&self.runner);
        let env = self.env.clone();

        tokio::spawn(async move {
            let mut workers = JoinSet::new();
            for task in tasks {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };
                let runner = Arc::clone(&runner);
                let env = env.clone();
                let stats = Arc::clone(&stats);
                let tx = tx.clone();

                workers.spawn(async move {
                    let _permit = permit;
                    debug!(path = %task.path().display(), "pipeline started");
                    let pipeline = async { SyncEngine::new(runner.as_ref(), &env).run(&task).await };
                    let outcome = match AssertUnwindSafe(pipeline).catch_unwind().await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            warn!(path = %task.path().display(), "pipeline panicked");
                            Outcome::aborted(task.path(), task.source(), "Internal error: the pipeline panicked")
                        }
                    };
                    debug!(
                        path = %outcome.path.display(),
                        status = outcome.status().text(),
                        "pipeline finished"
                    );
                    stats.record(&outcome);
                    // The receiver only goes away once the run is over
                    let _ = tx.send(outcome);
                });

                while workers.try_join_next().is_some() {}
            }
            drop(tx);
            while workers.join_next().await.is_some() {}
        })
    }
}

/// Cancellation flag raised by the first Ctrl-C
pub fn interrupt_on_ctrl_c() -> watch::Receiver<bool> {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received");
            let _ = cancel_tx.send(true);
        }
    });
    cancel_rx
}
