//! SimulatedWork - 固定時間スリープするだけの UnitOfWork
//!
//! 実処理の代わりに、決められた時間だけ待ってから成功を返します。

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Task, WorkOutcome};
use crate::ports::UnitOfWork;

#[derive(Debug, Clone)]
pub struct SimulatedWork {
    duration: Duration,
}

impl SimulatedWork {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[async_trait]
impl UnitOfWork for SimulatedWork {
    async fn perform(&self, task: &Task) -> WorkOutcome {
        tracing::debug!(task_id = %task.id, millis = self.duration.as_millis() as u64, "simulating work");
        tokio::time::sleep(self.duration).await;
        WorkOutcome::Success
    }
}
