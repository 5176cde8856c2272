use crate::error::TaskError;
use crate::storage::{FileBackend, InMemoryBackend, StorageBackend};
use crate::task::aggregate;
use crate::task::history::HistoryTracker;
use crate::task::schedule::ScheduleIndex;
use crate::task::store::EntityStore;
use crate::task::types::{Epic, Subtask, Task, TaskId, WorkItem};
use std::path::PathBuf;
use tracing::{debug, info};

/// Facade over the entity store, the schedule index and the history
/// tracker. Enforces the cross-entity rules: overlap rejection before any
/// mutation, epic re-aggregation after every subtask change, and cascading
/// deletes with no partially applied state visible afterwards.
///
/// The manager owns its components exclusively and is not internally
/// synchronized; a multi-threaded front end must serialize mutating calls
/// (the HTTP facade does so with a single mutex).
pub struct TaskManager {
    store: EntityStore,
    schedule: ScheduleIndex,
    history: HistoryTracker,
    backend: Box<dyn StorageBackend>,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager").finish_non_exhaustive()
    }
}

impl TaskManager {
    /// Manager with an explicit storage strategy.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            store: EntityStore::new(),
            schedule: ScheduleIndex::default(),
            history: HistoryTracker::new(),
            backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(InMemoryBackend))
    }

    /// Fresh manager that persists every mutation to `path`.
    pub fn file_backed(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(Box::new(FileBackend::new(path)))
    }

    /// Rebuild a manager from a previously saved file: the store is
    /// replayed, every epic re-aggregated, the schedule index rebuilt from
    /// the timed items, and the id counter resumed past the largest loaded
    /// id. The history starts empty. A missing file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TaskError> {
        let path = path.into();
        let mut store = FileBackend::load(&path)?;

        for epic_id in store.epic_ids() {
            aggregate::refresh(&mut store, epic_id);
        }
        let mut schedule = ScheduleIndex::default();
        for task in store.tasks() {
            schedule.insert(WorkItem::Task(task));
        }
        for subtask in store.subtasks() {
            schedule.insert(WorkItem::Subtask(subtask));
        }

        Ok(Self {
            store,
            schedule,
            history: HistoryTracker::new(),
            backend: Box::new(FileBackend::new(path)),
        })
    }

    // --- creates -----------------------------------------------------------

    /// Assigns the next id, which is also written back onto the caller's
    /// record. A scheduling conflict fails the call before any state
    /// changes, without consuming an id.
    pub fn create_task(&mut self, task: &mut Task) -> Result<TaskId, TaskError> {
        let mut record = task.clone();
        record.id = 0;
        if self.schedule.conflicts(&record) {
            return Err(TaskError::ScheduleConflict);
        }
        let id = self.store.create_task(&mut record);
        self.schedule.insert(WorkItem::Task(record));
        self.backend.persist(&self.store)?;
        task.id = id;
        info!(id, name = %task.name, "created task");
        Ok(id)
    }

    /// Epics carry no schedule of their own, so no overlap check applies.
    /// Any subtask links on the caller's record are discarded (a new epic
    /// owns nothing yet) and the record is overwritten with the stored
    /// snapshot, derived fields included.
    pub fn create_epic(&mut self, epic: &mut Epic) -> Result<TaskId, TaskError> {
        let mut record = epic.clone();
        record.base.id = 0;
        record.subtask_ids = Vec::new();
        let id = self.store.create_epic(&mut record);
        aggregate::refresh(&mut self.store, id);
        self.backend.persist(&self.store)?;
        *epic = self.store.epic(id)?;
        info!(id, name = %epic.base.name, "created epic");
        Ok(id)
    }

    /// The epic reference is validated before anything else; then the
    /// overlap check, then the store mutation, then the owner's refresh.
    pub fn create_subtask(&mut self, subtask: &mut Subtask) -> Result<TaskId, TaskError> {
        if !self.store.contains_epic(subtask.epic_id) {
            return Err(TaskError::UnknownEpic(subtask.epic_id));
        }
        let mut record = subtask.clone();
        record.base.id = 0;
        if self.schedule.conflicts(&record.base) {
            return Err(TaskError::ScheduleConflict);
        }
        let id = self.store.create_subtask(&mut record)?;
        aggregate::refresh(&mut self.store, record.epic_id);
        self.schedule.insert(WorkItem::Subtask(record));
        self.backend.persist(&self.store)?;
        subtask.base.id = id;
        info!(id, epic_id = subtask.epic_id, name = %subtask.base.name, "created subtask");
        Ok(id)
    }

    // --- updates -----------------------------------------------------------

    /// Full-record replacement keyed by `task.id`. Updating an id with no
    /// stored entry inserts it. The overlap check excludes the task's own
    /// id, so re-saving an unchanged schedule is not a conflict.
    pub fn update_task(&mut self, task: &Task) -> Result<(), TaskError> {
        if self.schedule.conflicts(task) {
            return Err(TaskError::ScheduleConflict);
        }
        self.store.update_task(task);
        self.schedule.remove(task.id);
        self.schedule.insert(WorkItem::Task(task.clone()));
        self.backend.persist(&self.store)?;
        debug!(id = task.id, "updated task");
        Ok(())
    }

    /// A subtask may move between epics here: the old owner is unlinked and
    /// re-aggregated alongside the new one.
    pub fn update_subtask(&mut self, subtask: &Subtask) -> Result<(), TaskError> {
        if !self.store.contains_epic(subtask.epic_id) {
            return Err(TaskError::UnknownEpic(subtask.epic_id));
        }
        if self.schedule.conflicts(&subtask.base) {
            return Err(TaskError::ScheduleConflict);
        }
        let previous_epic = self.store.subtask(subtask.id()).ok().map(|s| s.epic_id);
        self.store.update_subtask(subtask);
        if let Some(old_epic) = previous_epic {
            if old_epic != subtask.epic_id {
                self.store.unlink_subtask(old_epic, subtask.id());
                aggregate::refresh(&mut self.store, old_epic);
            }
        }
        self.store.link_subtask(subtask.epic_id, subtask.id());
        aggregate::refresh(&mut self.store, subtask.epic_id);
        self.schedule.remove(subtask.id());
        self.schedule.insert(WorkItem::Subtask(subtask.clone()));
        self.backend.persist(&self.store)?;
        debug!(id = subtask.id(), "updated subtask");
        Ok(())
    }

    /// Only the caller-authoritative fields (name, description) take
    /// effect: the stored subtask list survives the update and the derived
    /// fields are recomputed from it.
    pub fn update_epic(&mut self, epic: &Epic) -> Result<(), TaskError> {
        let mut record = epic.clone();
        if let Ok(existing) = self.store.epic(epic.id()) {
            record.subtask_ids = existing.subtask_ids;
        }
        self.store.update_epic(&record);
        aggregate::refresh(&mut self.store, record.id());
        self.backend.persist(&self.store)?;
        debug!(id = epic.id(), "updated epic");
        Ok(())
    }

    // --- reads -------------------------------------------------------------

    /// Lookup by id; a hit is also recorded as the most recent history
    /// entry.
    pub fn get_task(&mut self, id: TaskId) -> Result<Task, TaskError> {
        let task = self.store.task(id)?;
        self.history.add(WorkItem::Task(task.clone()));
        Ok(task)
    }

    pub fn get_epic(&mut self, id: TaskId) -> Result<Epic, TaskError> {
        let epic = self.store.epic(id)?;
        self.history.add(WorkItem::Epic(epic.clone()));
        Ok(epic)
    }

    pub fn get_subtask(&mut self, id: TaskId) -> Result<Subtask, TaskError> {
        let subtask = self.store.subtask(id)?;
        self.history.add(WorkItem::Subtask(subtask.clone()));
        Ok(subtask)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.store.tasks()
    }

    pub fn epics(&self) -> Vec<Epic> {
        self.store.epics()
    }

    pub fn subtasks(&self) -> Vec<Subtask> {
        self.store.subtasks()
    }

    pub fn epic_subtasks(&self, epic_id: TaskId) -> Result<Vec<Subtask>, TaskError> {
        self.store.epic(epic_id)?;
        Ok(self.store.subtasks_of(epic_id))
    }

    pub fn history(&self) -> Vec<WorkItem> {
        self.history.history()
    }

    pub fn prioritized(&self) -> Vec<WorkItem> {
        self.schedule.prioritized()
    }

    // --- deletes -----------------------------------------------------------

    pub fn delete_task(&mut self, id: TaskId) -> Result<(), TaskError> {
        self.store.remove_task(id)?;
        self.schedule.remove(id);
        self.history.remove(id);
        self.backend.persist(&self.store)?;
        info!(id, "deleted task");
        Ok(())
    }

    /// The former owner is refreshed after the removal so its status and
    /// window never reflect a subtask that no longer exists.
    pub fn delete_subtask(&mut self, id: TaskId) -> Result<(), TaskError> {
        let subtask = self.store.remove_subtask(id)?;
        aggregate::refresh(&mut self.store, subtask.epic_id);
        self.schedule.remove(id);
        self.history.remove(id);
        self.backend.persist(&self.store)?;
        info!(id, epic_id = subtask.epic_id, "deleted subtask");
        Ok(())
    }

    /// Cascades over every owned subtask: store, then schedule index, then
    /// history, for each, before the epic's own history entry goes.
    pub fn delete_epic(&mut self, id: TaskId) -> Result<(), TaskError> {
        let epic = self.store.remove_epic(id)?;
        for subtask_id in &epic.subtask_ids {
            let _ = self.store.remove_subtask(*subtask_id);
            self.schedule.remove(*subtask_id);
            self.history.remove(*subtask_id);
        }
        self.history.remove(id);
        self.backend.persist(&self.store)?;
        info!(id, subtasks = epic.subtask_ids.len(), "deleted epic");
        Ok(())
    }

    pub fn clear_tasks(&mut self) -> Result<(), TaskError> {
        for id in self.store.task_ids() {
            self.schedule.remove(id);
            self.history.remove(id);
        }
        self.store.clear_tasks();
        self.backend.persist(&self.store)?;
        info!("cleared all tasks");
        Ok(())
    }

    /// Every epic takes its subtasks with it.
    pub fn clear_epics(&mut self) -> Result<(), TaskError> {
        for id in self.store.subtask_ids() {
            self.schedule.remove(id);
            self.history.remove(id);
        }
        for id in self.store.epic_ids() {
            self.history.remove(id);
        }
        self.store.clear_epics();
        self.backend.persist(&self.store)?;
        info!("cleared all epics");
        Ok(())
    }

    /// Surviving epics are re-aggregated back to an empty-set rollup.
    pub fn clear_subtasks(&mut self) -> Result<(), TaskError> {
        for id in self.store.subtask_ids() {
            self.schedule.remove(id);
            self.history.remove(id);
        }
        self.store.clear_subtasks();
        for epic_id in self.store.epic_ids() {
            aggregate::refresh(&mut self.store, epic_id);
        }
        self.backend.persist(&self.store)?;
        info!("cleared all subtasks");
        Ok(())
    }
}
