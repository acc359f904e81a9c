//! TaskService - request layer から呼ばれる create / read / update
//!
//! HTTP や DTO の変換はここでは扱いません。呼び出し側から見た失敗は store の失敗と
//! 存在しない id だけで、処理結果は task の `status` でのみ観測できます。

use std::sync::Arc;

use tracing::info;

use super::scheduler::Scheduler;
use crate::domain::{NewTask, ServiceError, Task, TaskId, TaskStatus, UserId};
use crate::ports::{Clock, TaskStore};

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    scheduler: Arc<Scheduler>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, scheduler: Arc<Scheduler>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            scheduler,
            clock,
        }
    }

    /// Persist a new pending task and hand it to the scheduler right away.
    pub async fn create_task(&self, new: NewTask) -> Result<Task, ServiceError> {
        let task = self.store.create(new).await?;
        info!(task_id = %task.id, title = %task.title, priority = %task.priority, "created task");
        self.scheduler.submit(&task);
        Ok(task)
    }

    pub async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::TaskNotFound(id))
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.find_by_status(status).await?)
    }

    pub async fn tasks_by_assignee(&self, assignee: UserId) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.find_by_assignee(assignee).await?)
    }

    /// Manual status edit. Last write wins against the scheduler.
    ///
    /// Setting a task back to `Pending` re-submits it.
    pub async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, ServiceError> {
        let mut task = self.get_task(id).await?;
        task.set_status(status, self.clock.now());
        let task = self.store.save(task).await?;
        info!(task_id = %task.id, %status, "updated task status");

        if status == TaskStatus::Pending {
            self.scheduler.submit(&task);
        }
        Ok(task)
    }

    /// Re-enqueue every pending task. Returns how many were newly queued.
    pub async fn reprocess_pending(&self) -> Result<usize, ServiceError> {
        Ok(self.scheduler.reprocess_pending().await?)
    }
}
