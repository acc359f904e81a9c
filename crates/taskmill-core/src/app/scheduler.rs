//! Scheduler - 定期的な reload + drain
//!
//! # フロー（1 cycle）
//! 1. TaskStore::find_by_status(Pending) で pending を取得
//! 2. PriorityWorkQueue に enqueue（id で重複排除）
//! 3. 空になるまで drain_one → LifecycleExecutor::execute を逐次実行
//!
//! # 重複 cycle の扱い
//! drain 中に次の trigger が来た場合は skip する（skip-if-busy）。
//! タイマーは `MissedTickBehavior::Skip` なので、長い drain の後にまとめて発火しない。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::executor::LifecycleExecutor;
use super::report::CycleReport;
use crate::config::SchedulerConfig;
use crate::domain::{SchedulerError, StoreError, Task, TaskStatus};
use crate::queue::PriorityWorkQueue;
use crate::ports::TaskStore;

/// Periodic trigger plus one-drain-at-a-time processing.
pub struct Scheduler {
    config: SchedulerConfig,
    store: Arc<dyn TaskStore>,
    queue: Arc<PriorityWorkQueue>,
    executor: LifecycleExecutor,
    cancel: CancellationToken,
    draining: AtomicBool,
    cycles: AtomicU64,
}

/// Clears the drain flag when a cycle ends, however it ends.
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    pub(crate) fn from_parts(
        config: SchedulerConfig,
        store: Arc<dyn TaskStore>,
        queue: Arc<PriorityWorkQueue>,
        executor: LifecycleExecutor,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            executor,
            cancel,
            draining: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<PriorityWorkQueue> {
        &self.queue
    }

    /// Token shared with the executor. Cancelling it interrupts in-flight work and
    /// stops the periodic loop.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Number of cycles that have started so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    /// Push a freshly created or manually reset task straight into the queue.
    ///
    /// Never fails from the caller's point of view. Returns `false` when the task was
    /// not queued (already queued, or not pending).
    pub fn submit(&self, task: &Task) -> bool {
        let queued = self.queue.enqueue(task);
        if queued {
            info!(task_id = %task.id, title = %task.title, priority = %task.priority, "Added task to queue");
        } else {
            debug!(task_id = %task.id, status = %task.status, "task not queued (duplicate or not pending)");
        }
        queued
    }

    /// Re-enqueue every task the store holds as `Pending`.
    ///
    /// Active and completed tasks are not touched. Returns how many were newly queued.
    pub async fn reprocess_pending(&self) -> Result<usize, StoreError> {
        let pending = self.store.find_by_status(TaskStatus::Pending).await?;
        let queued = pending.iter().filter(|t| self.queue.enqueue(t)).count();
        info!(found = pending.len(), queued, "Reprocessing pending tasks");
        Ok(queued)
    }

    /// One full drain cycle: reload pending tasks, then process the queue until empty.
    ///
    /// # Errors
    /// - `Stopped` once the cancellation token has fired. Nothing is reloaded.
    /// - `Busy` when another cycle is still draining (the trigger is skipped).
    /// - `StoreUnavailable` when the store fails in a way that ends this cycle.
    ///   Entries still queued stay queued for the next cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport, SchedulerError> {
        if self.cancel.is_cancelled() {
            return Err(SchedulerError::Stopped);
        }
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            return Err(SchedulerError::Busy);
        };

        let cycle = self.cycles.fetch_add(1, Ordering::AcqRel) + 1;
        let mut report = CycleReport::new(cycle);
        info!(cycle, "Starting task processing cycle");

        let pending = self.store.find_by_status(TaskStatus::Pending).await?;
        report.reloaded = pending.len();
        report.enqueued = pending.iter().filter(|t| self.queue.enqueue(t)).count();
        debug!(cycle, reloaded = report.reloaded, enqueued = report.enqueued, "reloaded pending tasks");

        while !self.cancel.is_cancelled() {
            let Some(entry) = self.queue.drain_one() else {
                break;
            };

            match self.executor.execute(&entry).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(SchedulerError::InterruptedWork(task_id)) => {
                    report.interrupted = Some(task_id);
                    break;
                }
                Err(err) => {
                    error!(cycle, error = %err, remaining = self.queue.len(), "aborting processing cycle");
                    return Err(err);
                }
            }
        }

        info!(
            cycle,
            completed = report.completed().len(),
            requeued = report.requeued().len(),
            skipped = report.skipped().len(),
            "Completed task processing cycle"
        );
        Ok(report)
    }

    /// Periodic loop. Runs until cancelled, or until `max_cycles` cycles have been
    /// triggered.
    pub async fn run(&self, max_cycles: Option<u64>) {
        let period = self.config.processing_interval();
        let start = if self.config.run_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_ms = period.as_millis() as u64, "scheduler started");
        let mut triggered = 0u64;
        loop {
            if max_cycles.is_some_and(|max| triggered >= max) {
                break;
            }
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            triggered += 1;

            match self.run_cycle().await {
                Ok(report) => {
                    if let Some(task_id) = report.interrupted {
                        warn!(cycle = report.cycle, %task_id, "cycle interrupted");
                    }
                }
                Err(SchedulerError::Busy) => warn!("previous cycle still draining; skipping trigger"),
                Err(SchedulerError::Stopped) => break,
                Err(err) => error!(error = %err, "processing cycle failed"),
            }
        }
        info!("scheduler stopped");
    }

    /// Run the periodic loop on its own tokio task.
    pub fn spawn(self: Arc<Self>, max_cycles: Option<u64>) -> SchedulerHandle {
        let cancel = self.cancel.clone();
        let join = tokio::spawn(async move { self.run(max_cycles).await });
        SchedulerHandle { cancel, join }
    }
}

/// Handle to a spawned scheduler loop.
/// - `shutdown()` cancels in-flight work and waits for the loop to exit
/// - `join()` waits for the loop to finish on its own (cycle budget)
pub struct SchedulerHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn request_shutdown(&self) {
        self.cancel.cancel();
    }

    pub async fn shutdown(self) {
        self.request_shutdown();
        self.join().await;
    }

    pub async fn join(self) {
        if let Err(e) = self.join.await {
            error!(error = %e, "scheduler task panicked");
        }
    }
}
