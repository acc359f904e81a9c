//! taskmill-core
//!
//! Priority-ordered task scheduler that reconciles an in-memory work queue against a
//! persistent task store.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, status, priority, outcome, errors）
//! - **ports**: 抽象化レイヤー（TaskStore, UnitOfWork, Clock, IdGenerator）
//! - **queue**: PriorityWorkQueue（priority → created_at 順、id で重複排除）
//! - **app**: Scheduler, LifecycleExecutor, TaskService, SchedulerBuilder
//! - **impls**: InMemoryTaskStore, SimulatedWork, ScriptedWork
//! - **config**: SchedulerConfig（TOML）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;

pub use app::{CycleReport, Scheduler, SchedulerBuilder, SchedulerHandle, StatusCounts, TaskService};
pub use config::{ConfigError, SchedulerConfig};
pub use domain::{
    ExecutionOutcome, NewTask, Priority, SchedulerError, ServiceError, StoreError, Task, TaskId, TaskStatus,
    UserId, WorkOutcome,
};
pub use queue::{PriorityWorkQueue, QueueEntry};
