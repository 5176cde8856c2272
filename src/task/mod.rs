pub mod aggregate;
pub mod history;
pub mod manager;
pub mod schedule;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use history::HistoryTracker;
pub use manager::TaskManager;
pub use schedule::ScheduleIndex;
pub use store::EntityStore;
pub use types::{EntityKind, Epic, Subtask, Task, TaskId, TaskStatus, WorkItem};
