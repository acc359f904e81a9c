//! Errors - エラー型と分類
//!
//! - `StoreError`: TaskStore 実装が返すエラー
//! - `SchedulerError`: drain cycle / lifecycle executor のエラー
//! - `ServiceError`: TaskService（外部呼び出し口）のエラー

use thiserror::Error;

use super::TaskId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("task store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The work step was cancelled mid-flight. The task is left `Active`.
    #[error("work interrupted for {0}")]
    InterruptedWork(TaskId),

    /// Work or persistence failed inside the lifecycle and could not be recovered
    /// locally.
    #[error("processing failed for {task_id}: {reason}")]
    ProcessingFailure { task_id: TaskId, reason: String },

    /// The store failed in a way that ends the current drain cycle.
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    #[error("a drain cycle is already running")]
    Busy,

    /// The cancellation token has fired; no further cycles run.
    #[error("scheduler has been stopped")]
    Stopped,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("task not found with id: {0}")]
    TaskNotFound(TaskId),

    #[error(transparent)]
    Store(#[from] StoreError),
}
