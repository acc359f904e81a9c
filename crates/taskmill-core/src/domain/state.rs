//! Task status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a task.
///
/// State transitions:
/// - Pending -> Active -> Completed (success path)
/// - Active -> Pending (failure recovery, retried on a later drain)
///
/// Completed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Waiting to be picked up by a drain cycle.
    #[default]
    Pending,

    /// Claimed by the lifecycle executor; work is in flight.
    Active,

    /// Work finished successfully.
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::Active, TaskStatus::Completed];

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Only pending tasks may enter the work queue.
    pub fn is_runnable(self) -> bool {
        matches!(self, TaskStatus::Pending)
    }

    /// Transitions the lifecycle executor is allowed to perform.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Active)
                | (TaskStatus::Active, TaskStatus::Completed)
                | (TaskStatus::Active, TaskStatus::Pending)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Active => "active",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
