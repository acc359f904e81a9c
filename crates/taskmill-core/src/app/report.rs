//! CycleReport - drain cycle 1 回分の結果

use serde::Serialize;

use crate::domain::{ExecutionOutcome, TaskId};

/// What one drain cycle did, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number within this scheduler.
    pub cycle: u64,

    /// Pending tasks returned by the store at reload time.
    pub reloaded: usize,

    /// How many of those were not already queued.
    pub enqueued: usize,

    /// Executor results, in the order entries were drained.
    pub outcomes: Vec<ExecutionOutcome>,

    /// Set when cancellation stopped the cycle mid-task.
    pub interrupted: Option<TaskId>,
}

impl CycleReport {
    pub fn new(cycle: u64) -> Self {
        Self {
            cycle,
            ..Default::default()
        }
    }

    /// Ids of every task that reached the executor, in drain order.
    pub fn processing_order(&self) -> Vec<TaskId> {
        self.outcomes.iter().map(ExecutionOutcome::task_id).collect()
    }

    pub fn completed(&self) -> Vec<TaskId> {
        self.ids_where(|o| matches!(o, ExecutionOutcome::Completed { .. }))
    }

    pub fn requeued(&self) -> Vec<TaskId> {
        self.ids_where(|o| matches!(o, ExecutionOutcome::Requeued { .. }))
    }

    pub fn skipped(&self) -> Vec<TaskId> {
        self.ids_where(|o| matches!(o, ExecutionOutcome::Skipped { .. }))
    }

    fn ids_where(&self, pred: impl Fn(&ExecutionOutcome) -> bool) -> Vec<TaskId> {
        self.outcomes
            .iter()
            .filter(|o| pred(o))
            .map(ExecutionOutcome::task_id)
            .collect()
    }
}
