//! Ordered-by-start-time index over every timed task and subtask, backing
//! both the prioritized listing and overlap detection. Epics never enter
//! the index; their window is derived, not scheduled.

use crate::task::types::{Task, TaskId, WorkItem};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone)]
pub struct ScheduleIndex {
    /// Keyed by (start, id) so items sharing a start time coexist.
    by_start: BTreeMap<(DateTime<Utc>, TaskId), WorkItem>,
    /// Side map for O(log n) removal by id alone.
    starts: HashMap<TaskId, DateTime<Utc>>,
}

impl ScheduleIndex {
    /// Index a snapshot of the item. No-op for items without a start time.
    /// An already indexed id is replaced, not duplicated.
    pub fn insert(&mut self, item: WorkItem) {
        let Some(start) = item.start_time() else {
            return;
        };
        self.remove(item.id());
        self.starts.insert(item.id(), start);
        self.by_start.insert((start, item.id()), item);
    }

    pub fn remove(&mut self, id: TaskId) {
        if let Some(start) = self.starts.remove(&id) {
            self.by_start.remove(&(start, id));
        }
    }

    /// True if the candidate's half-open interval intersects any other
    /// indexed interval. Strict inequalities on both bounds, so adjacent
    /// intervals do not conflict. The candidate itself is excluded by id;
    /// items missing a start or duration never conflict.
    pub fn conflicts(&self, candidate: &Task) -> bool {
        let Some((candidate_start, candidate_end)) = candidate.interval() else {
            return false;
        };
        // Entries starting at or after the candidate's end cannot overlap.
        self.by_start
            .range(..(candidate_end, TaskId::MIN))
            .any(|(_, item)| {
                item.id() != candidate.id
                    && item
                        .interval()
                        .is_some_and(|(_, item_end)| item_end > candidate_start)
            })
    }

    /// Ascending-by-start snapshot of every indexed item.
    pub fn prioritized(&self) -> Vec<WorkItem> {
        self.by_start.values().cloned().collect()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.starts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_start.is_empty()
    }
}
