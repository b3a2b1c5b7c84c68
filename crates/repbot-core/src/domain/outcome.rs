//! Outcome model: how a task ended, and what a whole cycle did.

use serde::{Deserialize, Serialize};

use super::{ScoreLabel, TaskState};

/// Why a task was skipped without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyProcessed,
    ForeignCommunity,
}

/// Terminal result of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Score updated, success reply posted, item marked processed.
    Acknowledged { target: String, label: ScoreLabel },

    /// Error reply posted; score untouched.
    Rejected { message: String },

    /// Nothing done.
    Skipped { reason: SkipReason },

    /// A platform call failed. `reached` is the last state entered before the
    /// failure, so a failure after `Scored` means the label was written.
    Failed { reached: TaskState, error: String },
}

/// Summary of one `process_one_cycle` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub acknowledged: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Tasks left in the queue when the cycle ended. Always 0 today because
    /// the drain runs to completion, kept for monitoring.
    pub queue_remaining: usize,
}

impl CycleReport {
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Acknowledged { .. } => self.acknowledged += 1,
            TaskOutcome::Rejected { .. } => self.rejected += 1,
            TaskOutcome::Skipped { .. } => self.skipped += 1,
            TaskOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.acknowledged + self.rejected + self.skipped + self.failed
    }
}
