//! Priority work queue: transient ordering of pending tasks.

mod entry;
mod memory;

pub use entry::QueueEntry;
pub use memory::PriorityWorkQueue;
