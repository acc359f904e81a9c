//! Queue entry: a lightweight, non-owning snapshot of a pending task.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Priority, Task, TaskId};

/// What the queue keeps about a task.
///
/// The store record stays authoritative; the executor re-reads it by `task_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub task_id: TaskId,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,

    /// Insertion sequence within this process. Breaks remaining ties.
    pub seq: u64,
}

impl QueueEntry {
    pub(crate) fn new(task: &Task, seq: u64) -> Self {
        Self {
            task_id: task.id,
            priority: task.priority,
            created_at: task.created_at,
            seq,
        }
    }

    /// Drain key: (priority rank, created_at, seq), smallest first.
    fn key(&self) -> (u8, DateTime<Utc>, u64) {
        (self.priority.rank(), self.created_at, self.seq)
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
