//! In-memory priority queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::TaskQueue;
use crate::domain::CommandTask;

/// Heap entry.
///
/// `BinaryHeap` is a max-heap, so `Ord` is reversed: the entry with the
/// lowest `(priority, seq)` compares greatest and pops first.
#[derive(Debug)]
struct QueuedTask {
    priority: i32,
    seq: u64,
    task: CommandTask,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Unbounded in-memory `TaskQueue`.
#[derive(Debug, Default)]
pub struct InMemoryTaskQueue {
    heap: BinaryHeap<QueuedTask>,
    /// Insertion counter for the FIFO tie-break.
    next_seq: u64,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskQueue for InMemoryTaskQueue {
    fn enqueue(&mut self, task: CommandTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedTask {
            priority: task.priority,
            seq,
            task,
        });
    }

    fn dequeue(&mut self) -> Option<CommandTask> {
        self.heap.pop().map(|entry| entry.task)
    }

    fn peek(&self) -> Option<&CommandTask> {
        self.heap.peek().map(|entry| &entry.task)
    }

    fn size(&self) -> usize {
        self.heap.len()
    }
}
