//! Domain model (ids, task record, status, priority, outcomes, errors).

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod priority;
pub mod state;
pub mod task;

pub use errors::{SchedulerError, ServiceError, StoreError};
pub use ids::{TaskId, UserId};
pub use outcome::{ExecutionOutcome, SkipReason, WorkOutcome};
pub use priority::Priority;
pub use state::TaskStatus;
pub use task::{NewTask, Task};
