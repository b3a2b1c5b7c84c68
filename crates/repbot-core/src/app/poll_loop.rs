//! PollLoop - the scheduler that drives `Pipeline::process_one_cycle`.
//!
//! # Design
//! Fixed delay, not fixed rate: the next cycle starts `interval` after the
//! previous one finished, so cycles never overlap. Shutdown is only observed
//! between cycles; a cycle in progress always runs to completion.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use super::Pipeline;
use crate::domain::CycleReport;
use crate::ports::Platform;

/// Totals over every cycle a loop ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub cycles: usize,
    pub failed_cycles: usize,
    pub fetched: usize,
    pub acknowledged: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed_tasks: usize,
}

impl PollSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.fetched += report.fetched;
        self.acknowledged += report.acknowledged;
        self.rejected += report.rejected;
        self.skipped += report.skipped;
        self.failed_tasks += report.failed;
    }
}

#[derive(Debug, Clone)]
pub struct PollLoop {
    interval: Duration,
    fetch_limit: usize,
    max_cycles: Option<usize>,
}

impl PollLoop {
    pub fn new(interval: Duration, fetch_limit: usize) -> Self {
        Self {
            interval,
            fetch_limit,
            max_cycles: None,
        }
    }

    /// Stop on its own after `n` cycles.
    pub fn max_cycles(mut self, n: usize) -> Self {
        self.max_cycles = Some(n);
        self
    }

    /// Spawn the loop onto the runtime. The pipeline moves into the task.
    pub fn spawn<P>(self, pipeline: Pipeline<P>) -> PollHandle
    where
        P: Platform + ?Sized + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { self.run(pipeline, shutdown_rx).await });
        PollHandle { shutdown_tx, join }
    }

    async fn run<P>(self, mut pipeline: Pipeline<P>, mut shutdown_rx: watch::Receiver<bool>) -> PollSummary
    where
        P: Platform + ?Sized,
    {
        let mut summary = PollSummary::default();
        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            summary.cycles += 1;
            match pipeline.process_one_cycle(self.fetch_limit).await {
                Ok(report) => {
                    info!(
                        cycle = summary.cycles,
                        fetched = report.fetched,
                        acknowledged = report.acknowledged,
                        rejected = report.rejected,
                        skipped = report.skipped,
                        failed = report.failed,
                        "cycle finished"
                    );
                    summary.absorb(&report);
                }
                Err(err) => {
                    summary.failed_cycles += 1;
                    error!(cycle = summary.cycles, error = %err, "cycle failed");
                }
            }

            if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            info!(secs = self.interval.as_secs_f64(), "sleeping");
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    // Sender dropped counts as shutdown.
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        summary
    }
}

/// Handle to a spawned poll loop.
pub struct PollHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<PollSummary>,
}

impl PollHandle {
    /// Ask the loop to stop after the current cycle.
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already have finished
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the loop to end on its own (`max_cycles`).
    pub async fn join(self) -> Result<PollSummary, JoinError> {
        self.join.await
    }

    pub async fn shutdown_and_join(self) -> Result<PollSummary, JoinError> {
        self.request_shutdown();
        self.join.await
    }
}
