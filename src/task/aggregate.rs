//! Derivation of an epic's status and time window from its current
//! subtasks. Runs synchronously inside every mutation that can affect the
//! result, so a stored epic is never stale by more than one pass.

use crate::task::store::EntityStore;
use crate::task::types::{Subtask, TaskId, TaskStatus};
use chrono::{DateTime, Utc};

/// Pure function of a subtask set; applying it to the stored epic is the
/// caller's side of the contract.
#[derive(Debug, Clone, PartialEq)]
pub struct EpicRollup {
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Sum of the present subtask durations. Zero, never absent, when no
    /// subtask carries one; start and end go absent instead.
    pub duration_minutes: u32,
}

pub fn rollup(subtasks: &[Subtask]) -> EpicRollup {
    EpicRollup {
        status: derive_status(subtasks),
        start_time: subtasks.iter().filter_map(|s| s.base.start_time).min(),
        end_time: subtasks.iter().filter_map(|s| s.base.end_time()).max(),
        duration_minutes: subtasks.iter().filter_map(|s| s.base.duration_minutes).sum(),
    }
}

/// Empty set or all-NEW derives NEW; all-DONE derives DONE; any other mix,
/// including any IN_PROGRESS subtask, derives IN_PROGRESS.
fn derive_status(subtasks: &[Subtask]) -> TaskStatus {
    if subtasks.is_empty() {
        return TaskStatus::New;
    }
    let all = |status: TaskStatus| subtasks.iter().all(|s| s.base.status == status);
    if all(TaskStatus::Done) {
        TaskStatus::Done
    } else if all(TaskStatus::New) {
        TaskStatus::New
    } else {
        TaskStatus::InProgress
    }
}

/// Recompute and store the derived fields for one epic. A missing epic is
/// a no-op: deletion paths may race the refresh of a former owner.
pub fn refresh(store: &mut EntityStore, epic_id: TaskId) {
    let derived = rollup(&store.subtasks_of(epic_id));
    if let Some(epic) = store.epic_mut(epic_id) {
        epic.base.status = derived.status;
        epic.base.start_time = derived.start_time;
        epic.base.duration_minutes = Some(derived.duration_minutes);
        epic.end_time = derived.end_time;
    }
}
