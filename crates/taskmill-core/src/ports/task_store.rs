//! TaskStore port - 正本（source of truth）
//!
//! TaskStore は task record の永続化を担当します。
//! クエリやトランザクションの仕組みは実装側の責務で、core は以下の契約だけに依存します。
//!
//! - 書き込みは last-write-wins（楽観ロックなし）
//! - queue の中身はいつでも `find_by_status(Pending)` から再構築できる

use async_trait::async_trait;

use crate::domain::{NewTask, StoreError, Task, TaskId, TaskStatus, UserId};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task, assigning its id and creation timestamp.
    async fn create(&self, new: NewTask) -> Result<Task, StoreError>;

    /// Upsert. Returns the persisted representation.
    async fn save(&self, task: Task) -> Result<Task, StoreError>;

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StoreError>;

    async fn find_by_assignee(&self, assignee: UserId) -> Result<Vec<Task>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Task>, StoreError>;
}
