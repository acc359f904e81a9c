//! SchedulerBuilder - Scheduler の構築とワイヤリング
//!
//! store だけが必須で、それ以外は既定値で埋めます。
//! - work: `SimulatedWork`（config.simulated_work_millis）
//! - clock: `SystemClock`
//! - queue: 新しい `PriorityWorkQueue`
//! - cancel: 新しい `CancellationToken`

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::executor::LifecycleExecutor;
use super::scheduler::Scheduler;
use crate::config::SchedulerConfig;
use crate::impls::SimulatedWork;
use crate::ports::{Clock, SystemClock, TaskStore, UnitOfWork};
use crate::queue::PriorityWorkQueue;

/// # 使用例
/// ```ignore
/// let scheduler = SchedulerBuilder::new(store)
///     .config(SchedulerConfig::load("taskmill.toml")?)
///     .work(Arc::new(MyWork))
///     .build();
/// ```
pub struct SchedulerBuilder {
    store: Arc<dyn TaskStore>,
    config: SchedulerConfig,
    work: Option<Arc<dyn UnitOfWork>>,
    clock: Option<Arc<dyn Clock>>,
    queue: Option<Arc<PriorityWorkQueue>>,
    cancel: Option<CancellationToken>,
}

impl SchedulerBuilder {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            config: SchedulerConfig::default(),
            work: None,
            clock: None,
            queue: None,
            cancel: None,
        }
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn work(mut self, work: Arc<dyn UnitOfWork>) -> Self {
        self.work = Some(work);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing queue instead of creating one.
    pub fn queue(mut self, queue: Arc<PriorityWorkQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Tie the scheduler to an outer shutdown token.
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Scheduler {
        let work = self
            .work
            .unwrap_or_else(|| Arc::new(SimulatedWork::new(self.config.simulated_work())));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let queue = self.queue.unwrap_or_default();
        let cancel = self.cancel.unwrap_or_default();

        let executor = LifecycleExecutor::new(
            Arc::clone(&self.store),
            work,
            clock,
            self.config.work_timeout(),
            cancel.clone(),
        );
        Scheduler::from_parts(self.config, self.store, queue, executor, cancel)
    }
}
