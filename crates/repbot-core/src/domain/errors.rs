//! Error taxonomy for task processing.
//!
//! Two classes:
//! - user-facing rejections (`InvalidCommand`, `MalformedParent`,
//!   `SelfTarget`): recovered by the pipeline into a reply on the source item.
//! - platform I/O failures: fatal for the task, never retried in-process.

use thiserror::Error;

/// Failure of an external platform call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request rejected by platform: {0}")]
    Rejected(String),
}

impl PlatformError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Why a task did not reach `Acknowledged`.
///
/// The `Display` text of the user-facing variants is posted verbatim as the
/// error reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Command not understood: '{directive}'")]
    InvalidCommand { directive: String },

    #[error("Could not work out what this comment replies to ({parent_id}).")]
    MalformedParent { parent_id: String },

    #[error("No, no, no! You can't rate yourself!")]
    SelfTarget,

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl TaskError {
    /// True when the requester should be told about this error.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Platform(_))
    }
}
