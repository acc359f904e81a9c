//! LifecycleExecutor - 1 タスク分の状態遷移
//!
//! # フロー
//! 0. store から最新の record を読み直す（Pending 以外なら何もしない）
//! 1. Pending → Active を永続化
//! 2. UnitOfWork を実行（キャンセル・タイムアウト付き）
//! 3. 成功なら Active → Completed を永続化
//! 4. キャンセルなら遷移せずに止まる（Active のまま残る）
//! 5. それ以外の失敗（panic・タイムアウトを含む）は Pending に戻して永続化（リトライ回数・バックオフなし）

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::{
    ExecutionOutcome, SchedulerError, SkipReason, Task, TaskStatus, WorkOutcome,
};
use crate::ports::{Clock, TaskStore, UnitOfWork};
use crate::queue::QueueEntry;

/// Applies the status state machine to one dequeued task.
///
/// The executor is the only writer of `status` once a task has been queued. Every
/// transition is persisted before `execute` returns.
pub struct LifecycleExecutor {
    store: Arc<dyn TaskStore>,
    work: Arc<dyn UnitOfWork>,
    clock: Arc<dyn Clock>,
    work_timeout: Duration,
    cancel: CancellationToken,
}

impl LifecycleExecutor {
    pub fn new(
        store: Arc<dyn TaskStore>,
        work: Arc<dyn UnitOfWork>,
        clock: Arc<dyn Clock>,
        work_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            work,
            clock,
            work_timeout,
            cancel,
        }
    }

    /// Run the lifecycle for one queue entry.
    ///
    /// # Returns
    /// - `Ok(Completed)` / `Ok(Requeued)` / `Ok(Skipped)` for every locally handled case.
    /// - `Err(InterruptedWork)` when cancelled mid-work. The task stays `Active`.
    /// - `Err(StoreUnavailable)` when the store fails before the task was claimed, or
    ///   when resetting it to `Pending` cannot be persisted.
    pub async fn execute(&self, entry: &QueueEntry) -> Result<ExecutionOutcome, SchedulerError> {
        let task_id = entry.task_id;
        let Some(task) = self.store.find_by_id(task_id).await? else {
            warn!(%task_id, "queued task no longer exists in the store");
            return Ok(ExecutionOutcome::Skipped {
                task_id,
                reason: SkipReason::NotFound,
            });
        };

        // duplicate delivery, or someone else already moved it
        if task.status != TaskStatus::Pending {
            debug!(%task_id, status = %task.status, "skipping task that is not pending");
            return Ok(ExecutionOutcome::Skipped {
                task_id,
                reason: SkipReason::NotPending(task.status),
            });
        }

        info!(%task_id, title = %task.title, priority = %task.priority, "Processing task");

        match self.run_lifecycle(task.clone()).await {
            Ok(()) => {
                info!(%task_id, title = %task.title, "Completed processing task");
                Ok(ExecutionOutcome::Completed { task_id })
            }
            Err(SchedulerError::ProcessingFailure { reason, .. }) => self.requeue(task, reason).await,
            Err(err) => {
                if matches!(err, SchedulerError::InterruptedWork(_)) {
                    error!(%task_id, title = %task.title, "Task processing interrupted; leaving it active");
                }
                Err(err)
            }
        }
    }

    /// Steps 1-3. Store errors here are processing failures, not cycle-fatal.
    async fn run_lifecycle(&self, mut task: Task) -> Result<(), SchedulerError> {
        self.transition(&mut task, TaskStatus::Active)?;
        let task = self.persist(task).await?;

        match self.perform(&task).await {
            WorkOutcome::Success => {}
            WorkOutcome::Cancelled => return Err(SchedulerError::InterruptedWork(task.id)),
            WorkOutcome::Failed { reason } => {
                return Err(SchedulerError::ProcessingFailure {
                    task_id: task.id,
                    reason,
                });
            }
        }

        let mut task = task;
        self.transition(&mut task, TaskStatus::Completed)?;
        self.persist(task).await?;
        Ok(())
    }

    /// Step 2: the work itself, raced against cancellation and the timeout.
    ///
    /// The step runs on its own tokio task so a panic surfaces as a `JoinError`
    /// and is handled like any other failure.
    async fn perform(&self, task: &Task) -> WorkOutcome {
        let work = Arc::clone(&self.work);
        let owned = task.clone();
        let mut handle = tokio::spawn(async move { work.perform(&owned).await });
        let abort = handle.abort_handle();

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                abort.abort();
                WorkOutcome::Cancelled
            }
            res = tokio::time::timeout(self.work_timeout, &mut handle) => match res {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) if e.is_panic() => {
                    warn!(task_id = %task.id, error = %e, "work step panicked");
                    WorkOutcome::failed(format!("work panicked: {e}"))
                }
                Ok(Err(e)) => WorkOutcome::failed(format!("work aborted: {e}")),
                Err(_) => {
                    abort.abort();
                    WorkOutcome::failed(format!(
                        "work timed out after {}ms",
                        self.work_timeout.as_millis()
                    ))
                }
            },
        }
    }

    fn transition(&self, task: &mut Task, next: TaskStatus) -> Result<(), SchedulerError> {
        if !task.status.can_transition_to(next) {
            return Err(SchedulerError::ProcessingFailure {
                task_id: task.id,
                reason: format!("illegal transition {} -> {}", task.status, next),
            });
        }
        debug!(task_id = %task.id, from = %task.status, to = %next, "transition");
        task.set_status(next, self.clock.now());
        Ok(())
    }

    async fn persist(&self, task: Task) -> Result<Task, SchedulerError> {
        let task_id = task.id;
        let status = task.status;
        self.store
            .save(task)
            .await
            .map_err(|e| SchedulerError::ProcessingFailure {
                task_id,
                reason: format!("failed to persist {status}: {e}"),
            })
    }

    /// Step 5: back to the pending pool. Retried on the next drain, forever.
    async fn requeue(&self, mut task: Task, reason: String) -> Result<ExecutionOutcome, SchedulerError> {
        let task_id = task.id;
        error!(%task_id, title = %task.title, %reason, "Error processing task; resetting to pending");

        task.set_status(TaskStatus::Pending, self.clock.now());
        if let Err(e) = self.store.save(task).await {
            error!(%task_id, error = %e, "failed to reset task to pending");
            return Err(SchedulerError::StoreUnavailable(e));
        }
        Ok(ExecutionOutcome::Requeued { task_id, reason })
    }
}
