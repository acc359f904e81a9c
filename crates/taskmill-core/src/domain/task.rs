//! Task record: the durable work item owned by the TaskStore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Priority, TaskId, TaskStatus, UserId};

/// A persisted task.
///
/// The store copy is authoritative. Anything else (queue entries, copies held by
/// callers) is a snapshot and may be stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,

    /// Weak reference into the user store; never dereferenced here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,

    /// Set once at creation. Tie-break for tasks of equal priority.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Materialize a new task with a store-assigned id.
    pub fn from_new(id: TaskId, new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            status: TaskStatus::Pending,
            priority: new.priority,
            assignee: new.assignee,
            created_at: now,
            updated_at: now,
            due_date: new.due_date,
        }
    }

    /// Set the status and bump `updated_at`.
    ///
    /// This does not validate the transition; callers that own the lifecycle check
    /// [`TaskStatus::can_transition_to`] first.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

/// The unsaved shape of a task, as handed over by the request layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee: Option<UserId>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    #[test]
    fn new_task_starts_pending_with_creation_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id = TaskId::from_ulid(Ulid::new());
        let task = Task::from_new(id, NewTask::new("write docs", Priority::High), now);

        assert_eq!(task.id, id);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
        assert!(task.assignee.is_none());
    }

    #[test]
    fn set_status_keeps_created_at() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 5, 0).unwrap();
        let mut task = Task::from_new(
            TaskId::from_ulid(Ulid::new()),
            NewTask::new("t", Priority::Low),
            t0,
        );

        task.set_status(TaskStatus::Active, t1);

        assert_eq!(task.status, TaskStatus::Active);
        assert_eq!(task.created_at, t0);
        assert_eq!(task.updated_at, t1);
    }

    #[test]
    fn new_task_defaults_when_fields_are_missing() {
        let new: NewTask = serde_json::from_value(serde_json::json!({ "title": "bare" })).unwrap();
        assert_eq!(new.priority, Priority::Medium);
        assert!(new.description.is_empty());
        assert!(new.due_date.is_none());
    }
}
