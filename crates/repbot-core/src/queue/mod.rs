//! Queue module: the priority buffer between the fetch and drain phases.

mod memory;

pub use memory::InMemoryTaskQueue;

use crate::domain::CommandTask;

/// Queue port (interface).
///
/// Ordering contract:
/// - lower `priority` dequeues first;
/// - equal priorities dequeue in insertion order (FIFO).
///
/// The queue is owned by one pipeline and mutated only from its fetch and
/// drain phases, which never overlap. Hence `&mut self` and no locking.
pub trait TaskQueue: Send + Sync {
    fn enqueue(&mut self, task: CommandTask);

    /// Next task, or `None` when empty. Never blocks.
    fn dequeue(&mut self) -> Option<CommandTask>;

    fn peek(&self) -> Option<&CommandTask>;

    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
