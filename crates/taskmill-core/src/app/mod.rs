//! App - アプリケーション層
//!
//! ports を組み合わせてスケジューラを構成します。
//!
//! # 主要コンポーネント
//! - **SchedulerBuilder**: 構築とワイヤリング
//! - **Scheduler**: 定期 reload + drain（skip-if-busy）
//! - **LifecycleExecutor**: 1 タスク分の状態遷移
//! - **TaskService**: create / read / update の入口
//! - **StatusCounts**: status ごとの件数

pub mod builder;
pub mod executor;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod status;

pub use self::builder::SchedulerBuilder;
pub use self::executor::LifecycleExecutor;
pub use self::report::CycleReport;
pub use self::scheduler::{Scheduler, SchedulerHandle};
pub use self::service::TaskService;
pub use self::status::StatusCounts;
