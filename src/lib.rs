//! # Taskboard
//!
//! In-memory tracker for three kinds of work items (atomic tasks, grouping
//! epics and epic-owned subtasks) with derived epic state, an overlap-free
//! schedule of timed items, a recency-ordered access history, optional
//! file persistence and a JSON HTTP API.
//!
//! ## Architecture
//!
//! - **[`task`]**: the core entity store, epic aggregation, schedule
//!   index, history tracker and the [`TaskManager`] facade tying them
//!   together.
//! - **[`storage`]**: pluggable persistence backends (in-memory no-op and
//!   the line-oriented file format).
//! - **[`server`]**: axum HTTP facade exposing tasks, epics, subtasks,
//!   history and the prioritized listing.
//!
//! The core is single-threaded: no component is internally synchronized,
//! and the HTTP layer serializes every call through one mutex before it
//! reaches the manager.

pub mod error;
pub mod server;
pub mod storage;
pub mod task;

pub use error::TaskError;
pub use task::{Epic, Subtask, Task, TaskId, TaskManager, TaskStatus, WorkItem};
