use crate::error::TaskError;
use crate::task::types::{EntityKind, Epic, Subtask, Task, TaskId};
use std::collections::HashMap;
use tracing::debug;

/// In-memory entity store: three independent keyed collections plus the
/// shared id counter. All reads hand out decoupled clones and all writes
/// take ownership of a snapshot, so no internal reference ever escapes to
/// a caller.
#[derive(Debug, Clone)]
pub struct EntityStore {
    tasks: HashMap<TaskId, Task>,
    epics: HashMap<TaskId, Epic>,
    subtasks: HashMap<TaskId, Subtask>,
    next_id: TaskId,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            epics: HashMap::new(),
            subtasks: HashMap::new(),
            next_id: 1,
        }
    }

    /// Issue the next identifier. The counter only ever increases; ids of
    /// deleted entities are never handed out again.
    fn allocate_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Bump the counter past every identifier seen in a reload.
    pub(crate) fn resume_ids_after(&mut self, max_seen: TaskId) {
        if max_seen >= self.next_id {
            self.next_id = max_seen + 1;
        }
    }

    pub fn create_task(&mut self, task: &mut Task) -> TaskId {
        let id = self.allocate_id();
        task.id = id;
        self.tasks.insert(id, task.clone());
        debug!(id, name = %task.name, "stored task");
        id
    }

    pub fn create_epic(&mut self, epic: &mut Epic) -> TaskId {
        let id = self.allocate_id();
        epic.base.id = id;
        self.epics.insert(id, epic.clone());
        debug!(id, name = %epic.base.name, "stored epic");
        id
    }

    /// Fails with `UnknownEpic` before any state changes if the named epic
    /// is not stored; on success the new id is linked into the owner's
    /// subtask list.
    pub fn create_subtask(&mut self, subtask: &mut Subtask) -> Result<TaskId, TaskError> {
        if !self.epics.contains_key(&subtask.epic_id) {
            return Err(TaskError::UnknownEpic(subtask.epic_id));
        }
        let id = self.allocate_id();
        subtask.base.id = id;
        self.subtasks.insert(id, subtask.clone());
        self.link_subtask(subtask.epic_id, id);
        debug!(id, epic_id = subtask.epic_id, name = %subtask.base.name, "stored subtask");
        Ok(id)
    }

    /// Unconditional upsert keyed by `task.id`: a missing entry is inserted
    /// rather than rejected.
    pub fn update_task(&mut self, task: &Task) {
        self.tasks.insert(task.id, task.clone());
    }

    pub fn update_epic(&mut self, epic: &Epic) {
        self.epics.insert(epic.id(), epic.clone());
    }

    pub fn update_subtask(&mut self, subtask: &Subtask) {
        self.subtasks.insert(subtask.id(), subtask.clone());
    }

    pub fn task(&self, id: TaskId) -> Result<Task, TaskError> {
        self.tasks.get(&id).cloned().ok_or(TaskError::NotFound {
            kind: EntityKind::Task,
            id,
        })
    }

    pub fn epic(&self, id: TaskId) -> Result<Epic, TaskError> {
        self.epics.get(&id).cloned().ok_or(TaskError::NotFound {
            kind: EntityKind::Epic,
            id,
        })
    }

    pub fn subtask(&self, id: TaskId) -> Result<Subtask, TaskError> {
        self.subtasks.get(&id).cloned().ok_or(TaskError::NotFound {
            kind: EntityKind::Subtask,
            id,
        })
    }

    pub fn contains_epic(&self, id: TaskId) -> bool {
        self.epics.contains_key(&id)
    }

    pub fn remove_task(&mut self, id: TaskId) -> Result<Task, TaskError> {
        self.tasks.remove(&id).ok_or(TaskError::NotFound {
            kind: EntityKind::Task,
            id,
        })
    }

    /// Removes only the epic record; cascading over its subtasks is the
    /// facade's job, driven by the returned subtask list.
    pub fn remove_epic(&mut self, id: TaskId) -> Result<Epic, TaskError> {
        self.epics.remove(&id).ok_or(TaskError::NotFound {
            kind: EntityKind::Epic,
            id,
        })
    }

    /// Removes the subtask and unlinks it from its owner, if that epic
    /// still exists.
    pub fn remove_subtask(&mut self, id: TaskId) -> Result<Subtask, TaskError> {
        let subtask = self.subtasks.remove(&id).ok_or(TaskError::NotFound {
            kind: EntityKind::Subtask,
            id,
        })?;
        if let Some(epic) = self.epics.get_mut(&subtask.epic_id) {
            epic.subtask_ids.retain(|&sub_id| sub_id != id);
        }
        Ok(subtask)
    }

    /// Snapshot list, ordered by id for deterministic output.
    pub fn tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by_key(|task| task.id);
        tasks
    }

    pub fn epics(&self) -> Vec<Epic> {
        let mut epics: Vec<Epic> = self.epics.values().cloned().collect();
        epics.sort_by_key(Epic::id);
        epics
    }

    pub fn subtasks(&self) -> Vec<Subtask> {
        let mut subtasks: Vec<Subtask> = self.subtasks.values().cloned().collect();
        subtasks.sort_by_key(Subtask::id);
        subtasks
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn epic_ids(&self) -> Vec<TaskId> {
        self.epics.keys().copied().collect()
    }

    pub fn subtask_ids(&self) -> Vec<TaskId> {
        self.subtasks.keys().copied().collect()
    }

    /// Current subtasks of an epic, in the epic's insertion order. Ids
    /// without a stored subtask are skipped.
    pub fn subtasks_of(&self, epic_id: TaskId) -> Vec<Subtask> {
        let Some(epic) = self.epics.get(&epic_id) else {
            return Vec::new();
        };
        epic.subtask_ids
            .iter()
            .filter_map(|id| self.subtasks.get(id))
            .cloned()
            .collect()
    }

    pub(crate) fn link_subtask(&mut self, epic_id: TaskId, subtask_id: TaskId) {
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            if !epic.subtask_ids.contains(&subtask_id) {
                epic.subtask_ids.push(subtask_id);
            }
        }
    }

    pub(crate) fn unlink_subtask(&mut self, epic_id: TaskId, subtask_id: TaskId) {
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.subtask_ids.retain(|&id| id != subtask_id);
        }
    }

    pub(crate) fn epic_mut(&mut self, id: TaskId) -> Option<&mut Epic> {
        self.epics.get_mut(&id)
    }

    pub fn clear_tasks(&mut self) {
        self.tasks.clear();
    }

    /// Dropping the epics drops every subtask with them.
    pub fn clear_epics(&mut self) {
        self.epics.clear();
        self.subtasks.clear();
    }

    /// Clears the subtask collection and every epic's subtask list; the
    /// caller re-aggregates the surviving epics.
    pub fn clear_subtasks(&mut self) {
        self.subtasks.clear();
        for epic in self.epics.values_mut() {
            epic.subtask_ids.clear();
        }
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
