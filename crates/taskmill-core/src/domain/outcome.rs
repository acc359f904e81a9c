//! Outcome model: explicit results of the work step and of one lifecycle run.
//!
//! The work step reports what happened as a value; the lifecycle executor turns that
//! value into a persisted status transition.

use serde::{Deserialize, Serialize};

use super::{TaskId, TaskStatus};

/// Result of running the unit of work for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOutcome {
    /// Work finished; the task can be completed.
    Success,

    /// Work was interrupted. The task is left as it is.
    Cancelled,

    /// Work failed; the task goes back to the pending pool.
    Failed { reason: String },
}

impl WorkOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkOutcome::Success)
    }
}

/// Why the executor declined to process a dequeued entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The store no longer knows the task.
    NotFound,

    /// The store copy is not pending anymore (duplicate delivery, already done, or
    /// in flight elsewhere).
    NotPending(TaskStatus),
}

/// What the lifecycle executor did with one dequeued entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    /// Pending -> Active -> Completed.
    Completed { task_id: TaskId },

    /// Pending -> Active -> Pending. Eligible again on the next drain.
    Requeued { task_id: TaskId, reason: String },

    /// No transition was made.
    Skipped { task_id: TaskId, reason: SkipReason },
}

impl ExecutionOutcome {
    pub fn task_id(&self) -> TaskId {
        match self {
            ExecutionOutcome::Completed { task_id }
            | ExecutionOutcome::Requeued { task_id, .. }
            | ExecutionOutcome::Skipped { task_id, .. } => *task_id,
        }
    }
}
