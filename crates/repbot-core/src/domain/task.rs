use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Command, Comment, TaskId};

/// Priority given to tasks built from mentions.
pub const MENTION_PRIORITY: i32 = 2;

/// One unit of queued work derived from an inbound comment.
///
/// Lower `priority` values dequeue first. `enqueued_at` is diagnostic only;
/// ordering among equal priorities is by insertion, not by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTask {
    pub id: TaskId,
    pub command: Command,
    pub item: Comment,
    pub priority: i32,
    pub enqueued_at: DateTime<Utc>,
}

impl CommandTask {
    pub fn new(
        id: TaskId,
        command: Command,
        item: Comment,
        priority: i32,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            command,
            item,
            priority,
            enqueued_at,
        }
    }
}
