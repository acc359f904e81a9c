//! Status - ステータス集計
//!
//! store の status ごとの件数と、queue に載っている件数をまとめて返します。

use serde::{Deserialize, Serialize};

use crate::domain::{StoreError, TaskStatus};
use crate::ports::TaskStore;
use crate::queue::PriorityWorkQueue;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub active: usize,
    pub completed: usize,

    /// Entries currently waiting in the in-memory queue.
    pub queued: usize,
}

impl StatusCounts {
    pub async fn collect(store: &dyn TaskStore, queue: &PriorityWorkQueue) -> Result<Self, StoreError> {
        let mut counts = StatusCounts {
            queued: queue.len(),
            ..Default::default()
        };
        for task in store.find_all().await? {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Active => counts.active += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.pending + self.active + self.completed
    }
}
