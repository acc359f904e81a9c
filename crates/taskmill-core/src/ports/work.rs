//! UnitOfWork port - 1 タスク分の実処理
//!
//! 実処理は `WorkOutcome` を値として返します（例外的な制御フローは使わない）。
//! タイムアウトとキャンセルは `LifecycleExecutor` 側が被せます。

use async_trait::async_trait;

use crate::domain::{Task, WorkOutcome};

/// The opaque, potentially long-running work performed for one task.
///
/// The executor awaits `perform` to completion before it touches the next queued
/// task, so implementations run strictly one at a time within a drain cycle.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn perform(&self, task: &Task) -> WorkOutcome;
}
