//! InMemoryTaskStore - 開発・テスト用の TaskStore
//!
//! # 実装詳細
//! - `tokio::sync::RwLock<HashMap<TaskId, Task>>` で record を管理
//! - 採番は IdGenerator、created_at は Clock から
//! - 障害注入: `set_available(false)` で全操作が失敗、`fail_next_saves(n)` で次の n 回の save が失敗
//! - save ごとの status 履歴を直近 `SAVE_LOG_CAPACITY` 件まで記録（遷移が永続化されたかをテストで確認するため）

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{NewTask, StoreError, Task, TaskId, TaskStatus, UserId};
use crate::ports::{Clock, IdGenerator, SystemClock, TaskStore, UlidGenerator};

/// Oldest save-log entries are dropped past this size.
pub const SAVE_LOG_CAPACITY: usize = 1024;

#[derive(Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    save_log: VecDeque<(TaskId, TaskStatus)>,
}

pub struct InMemoryTaskStore {
    state: RwLock<StoreState>,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    available: AtomicBool,
    failing_saves: AtomicUsize,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let ids = Box::new(UlidGenerator::new(Arc::clone(&clock)));
        Self {
            state: RwLock::new(StoreState::default()),
            clock,
            ids,
            available: AtomicBool::new(true),
            failing_saves: AtomicUsize::new(0),
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make the next `n` calls to `save` fail with `StoreError::Unavailable`.
    pub fn fail_next_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    /// Statuses written through `save` for `id`, oldest first. Only the most recent
    /// `SAVE_LOG_CAPACITY` saves across all tasks are kept.
    pub async fn saved_statuses(&self, id: TaskId) -> Vec<TaskStatus> {
        let state = self.state.read().await;
        state
            .save_log
            .iter()
            .filter(|(task_id, _)| *task_id == id)
            .map(|(_, status)| *status)
            .collect()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store switched off".to_string()))
        }
    }

    fn take_injected_save_failure(&self) -> bool {
        self.failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        tasks
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, new: NewTask) -> Result<Task, StoreError> {
        self.check_available()?;
        let task = Task::from_new(self.ids.generate_task_id(), new, self.clock.now());
        let mut state = self.state.write().await;
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn save(&self, task: Task) -> Result<Task, StoreError> {
        self.check_available()?;
        if self.take_injected_save_failure() {
            return Err(StoreError::Unavailable(format!("injected save failure for {}", task.id)));
        }
        let mut state = self.state.write().await;
        if state.save_log.len() == SAVE_LOG_CAPACITY {
            state.save_log.pop_front();
        }
        state.save_log.push_back((task.id, task.status));
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let tasks = state.tasks.values().filter(|t| t.status == status).cloned().collect();
        Ok(Self::sorted(tasks))
    }

    async fn find_by_assignee(&self, assignee: UserId) -> Result<Vec<Task>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let tasks = state
            .tasks
            .values()
            .filter(|t| t.assignee == Some(assignee))
            .cloned()
            .collect();
        Ok(Self::sorted(tasks))
    }

    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(Self::sorted(state.tasks.values().cloned().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use crate::ports::ManualClock;
    use chrono::{Duration, TimeZone, Utc};
    use ulid::Ulid;

    #[tokio::test]
    async fn create_assigns_id_and_created_at() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let store = InMemoryTaskStore::with_clock(Arc::new(ManualClock::new(start)));

        let task = store.create(NewTask::new("a", Priority::High)).await.unwrap();

        assert_eq!(task.created_at, start);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(store.find_by_id(task.id).await.unwrap(), Some(task));
    }

    #[tokio::test]
    async fn find_by_status_orders_by_creation() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let store = InMemoryTaskStore::with_clock(clock.clone());

        let first = store.create(NewTask::new("first", Priority::Low)).await.unwrap();
        clock.advance(Duration::seconds(1));
        let second = store.create(NewTask::new("second", Priority::High)).await.unwrap();
        clock.advance(Duration::seconds(1));
        let mut done = store.create(NewTask::new("done", Priority::High)).await.unwrap();
        done.status = TaskStatus::Completed;
        store.save(done).await.unwrap();

        let pending = store.find_by_status(TaskStatus::Pending).await.unwrap();
        let ids: Vec<TaskId> = pending.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn find_by_assignee_filters() {
        let store = InMemoryTaskStore::new();
        let alice = UserId::from_ulid(Ulid::new());

        let mine = store
            .create(NewTask::new("mine", Priority::Medium).with_assignee(alice))
            .await
            .unwrap();
        store.create(NewTask::new("theirs", Priority::Medium)).await.unwrap();

        let found = store.find_by_assignee(alice).await.unwrap();
        assert_eq!(found, vec![mine]);
    }

    #[tokio::test]
    async fn save_records_status_history() {
        let store = InMemoryTaskStore::new();
        let mut task = store.create(NewTask::new("a", Priority::High)).await.unwrap();

        task.status = TaskStatus::Active;
        store.save(task.clone()).await.unwrap();
        task.status = TaskStatus::Completed;
        store.save(task.clone()).await.unwrap();

        assert_eq!(
            store.saved_statuses(task.id).await,
            vec![TaskStatus::Active, TaskStatus::Completed]
        );
    }

    #[tokio::test]
    async fn outage_fails_every_call() {
        let store = InMemoryTaskStore::new();
        store.set_available(false);

        let err = store.find_by_status(TaskStatus::Pending).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_available(true);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_save_failures_are_consumed() {
        let store = InMemoryTaskStore::new();
        let task = store.create(NewTask::new("a", Priority::High)).await.unwrap();
        store.fail_next_saves(1);

        assert!(store.save(task.clone()).await.is_err());
        assert!(store.save(task).await.is_ok());
    }

    #[tokio::test]
    async fn save_log_keeps_only_recent_entries() {
        let store = InMemoryTaskStore::new();
        let mut task = store.create(NewTask::new("looping", Priority::Low)).await.unwrap();

        for i in 0..SAVE_LOG_CAPACITY + 10 {
            task.status = if i % 2 == 0 { TaskStatus::Active } else { TaskStatus::Pending };
            store.save(task.clone()).await.unwrap();
        }

        let log = store.saved_statuses(task.id).await;
        assert_eq!(log.len(), SAVE_LOG_CAPACITY);
        assert_eq!(log.last(), Some(&TaskStatus::Pending));
    }
}
