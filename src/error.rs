use crate::task::types::{EntityKind, TaskId};
use thiserror::Error;

/// Failures surfaced by the task manager and its storage layer.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Lookup or delete aimed at an id with no stored entity of that kind.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: TaskId },

    /// A subtask referenced an epic that is not stored.
    #[error("epic {0} does not exist")]
    UnknownEpic(TaskId),

    /// The record's interval overlaps an already scheduled item.
    #[error("scheduled interval overlaps another task")]
    ScheduleConflict,

    /// Persistence failed; the in-memory state may be ahead of the file.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::Storage(err.to_string())
    }
}
