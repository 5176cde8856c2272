use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier shared by tasks, epics and subtasks. A single counter issues
/// ids across all three kinds, so an id is unique board-wide and never
/// reused. `0` means "not yet assigned" on the wire: an upsert carrying a
/// zero id is a create, anything else is an update.
pub type TaskId = u32;

/// Workflow state of a task or subtask. Any state is reachable from any
/// other via an explicit update; only epics derive their status instead of
/// storing it authoritatively.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TaskStatus::New => "NEW",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        };
        f.write_str(tag)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(TaskStatus::New),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Which of the three collections an entity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Epic,
    Subtask,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EntityKind::Task => "TASK",
            EntityKind::Epic => "EPIC",
            EntityKind::Subtask => "SUBTASK",
        };
        f.write_str(tag)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TASK" => Ok(EntityKind::Task),
            "EPIC" => Ok(EntityKind::Epic),
            "SUBTASK" => Ok(EntityKind::Subtask),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

/// Atomic unit of work, and the base field set shared by all three kinds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Scheduled length in whole minutes, matching the wire format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            status: TaskStatus::New,
            duration_minutes: None,
            start_time: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_schedule(mut self, start: DateTime<Utc>, minutes: u32) -> Self {
        self.start_time = Some(start);
        self.duration_minutes = Some(minutes);
        self
    }

    /// End of the scheduled interval; present only when both start and
    /// duration are.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.interval().map(|(_, end)| end)
    }

    /// Half-open scheduled interval `[start, start + duration)`.
    pub fn interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start_time?;
        let minutes = self.duration_minutes?;
        Some((start, start + Duration::minutes(i64::from(minutes))))
    }
}

/// Grouping entity. The base status, start time and duration plus the
/// stored `end_time` are derived from the current subtasks by the
/// aggregator; callers never set them directly.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Epic {
    #[serde(flatten)]
    pub base: Task,
    /// Insertion-ordered, non-owning references to this epic's subtasks.
    #[serde(default)]
    pub subtask_ids: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Epic {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            base: Task::new(name, description),
            subtask_ids: Vec::new(),
            end_time: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.base.id
    }
}

/// Work item owned by exactly one epic. Cannot exist without a
/// pre-existing epic.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Subtask {
    #[serde(flatten)]
    pub base: Task,
    pub epic_id: TaskId,
}

impl Subtask {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        epic_id: TaskId,
    ) -> Self {
        Self {
            base: Task::new(name, description),
            epic_id,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.base.status = status;
        self
    }

    pub fn with_schedule(mut self, start: DateTime<Utc>, minutes: u32) -> Self {
        self.base = self.base.with_schedule(start, minutes);
        self
    }

    pub fn id(&self) -> TaskId {
        self.base.id
    }
}

/// Tagged view over the three entity kinds, used by the history log and
/// the prioritized listing. Behavior differs only in which index or
/// aggregator touches the variant, so no dispatch beyond the tag is needed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkItem {
    Task(Task),
    Epic(Epic),
    Subtask(Subtask),
}

impl WorkItem {
    pub fn id(&self) -> TaskId {
        self.base().id
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            WorkItem::Task(_) => EntityKind::Task,
            WorkItem::Epic(_) => EntityKind::Epic,
            WorkItem::Subtask(_) => EntityKind::Subtask,
        }
    }

    pub fn base(&self) -> &Task {
        match self {
            WorkItem::Task(task) => task,
            WorkItem::Epic(epic) => &epic.base,
            WorkItem::Subtask(subtask) => &subtask.base,
        }
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.base().start_time
    }

    pub fn interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.base().interval()
    }
}
