//! Per-task state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task state.
///
/// State transitions:
/// - Received -> Validated -> Resolved -> Scored -> Acknowledged
/// - Received -> Skipped (already processed, or foreign community)
/// - Received -> Rejected (invalid directive)
/// - Validated -> Rejected (malformed parent, self-target)
///
/// A platform failure can stop a task in any non-terminal state; that is
/// reported as `TaskOutcome::Failed` rather than as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Received,
    Validated,
    Resolved,
    Scored,
    Acknowledged,
    Rejected,
    Skipped,
}

impl TaskState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Acknowledged | TaskState::Rejected | TaskState::Skipped
        )
    }

    pub fn can_transition_to(self, next: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Received, Skipped)
                | (Received, Rejected)
                | (Validated, Resolved)
                | (Validated, Rejected)
                | (Resolved, Scored)
                | (Scored, Acknowledged)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Received => "received",
            TaskState::Validated => "validated",
            TaskState::Resolved => "resolved",
            TaskState::Scored => "scored",
            TaskState::Acknowledged => "acknowledged",
            TaskState::Rejected => "rejected",
            TaskState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}
