//! Domain model (ids, items, commands, labels, states, outcomes, errors).

pub mod command;
pub mod errors;
pub mod ids;
pub mod item;
pub mod label;
pub mod outcome;
pub mod state;
pub mod task;

pub use command::{Command, Directive};
pub use errors::{PlatformError, TaskError};
pub use ids::TaskId;
pub use item::{Comment, ItemId, ParentRef, ResolvedTarget, RootItem, RootKind};
pub use label::ScoreLabel;
pub use outcome::{CycleReport, SkipReason, TaskOutcome};
pub use state::TaskState;
pub use task::{CommandTask, MENTION_PRIORITY};
