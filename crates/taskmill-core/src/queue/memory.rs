//! In-memory priority work queue.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::QueueEntry;
use crate::domain::{Task, TaskId};

/// Queue state behind the lock.
#[derive(Default)]
struct QueueState {
    /// Min-heap on the drain key.
    heap: BinaryHeap<Reverse<QueueEntry>>,

    /// Ids currently in `heap`. The queue behaves as a set for membership.
    members: HashSet<TaskId>,

    /// Next insertion sequence number.
    next_seq: u64,
}

/// Concurrency-safe priority queue of pending tasks.
///
/// Design:
/// - Any number of producers may `enqueue` while one consumer drains.
/// - The lock is a plain `std::sync::Mutex`: every critical section is a few heap
///   operations and never spans an `.await`.
/// - Contents are disposable. A restart loses them and the next reload rebuilds
///   them from the store.
#[derive(Default)]
pub struct PriorityWorkQueue {
    state: Mutex<QueueState>,
}

impl PriorityWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // entries are only hints; a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a pending task.
    ///
    /// Returns `false` if the task is not `Pending` or its id is already queued.
    pub fn enqueue(&self, task: &Task) -> bool {
        if !task.status.is_runnable() {
            return false;
        }

        let mut state = self.lock();
        if !state.members.insert(task.id) {
            return false;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Reverse(QueueEntry::new(task, seq)));
        true
    }

    /// Remove and return the entry with the smallest (priority, created_at) key.
    pub fn drain_one(&self) -> Option<QueueEntry> {
        let mut state = self.lock();
        let Reverse(entry) = state.heap.pop()?;
        state.members.remove(&entry.task_id);
        Some(entry)
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.lock().members.contains(&task_id)
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }

    /// Entries in drain order, for observability.
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        let state = self.lock();
        let mut entries: Vec<QueueEntry> = state.heap.iter().map(|Reverse(e)| e.clone()).collect();
        entries.sort();
        entries
    }
}
