//! Line-oriented file backend. One fixed header line, then one
//! comma-separated row per entity: tasks first, then epics, then subtasks.
//! Optional fields (duration, start time, epic id) serialize as empty
//! columns; duration is whole minutes and start time RFC 3339.

use crate::error::TaskError;
use crate::task::store::EntityStore;
use crate::task::types::{EntityKind, Epic, Subtask, Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADER: &str = "id,type,name,status,description,duration,startTime,epic";

#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Rebuild the entity store from a previously saved file. Rows are
    /// replayed in file order, each subtask is relinked into its owner's
    /// subtask list, and the id counter resumes past the largest loaded
    /// id. A missing file is an error, not an empty board.
    pub fn load(path: &Path) -> Result<EntityStore, TaskError> {
        let content = fs::read_to_string(path)
            .map_err(|e| TaskError::Storage(format!("cannot read {}: {e}", path.display())))?;

        let mut store = EntityStore::new();
        let mut max_id = 0;
        for (line_no, line) in content.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let row = decode_row(line)
                .map_err(|e| TaskError::Storage(format!("line {}: {e}", line_no + 1)))?;
            max_id = max_id.max(row_id(&row));
            match row {
                Row::Task(task) => store.update_task(&task),
                Row::Epic(epic) => store.update_epic(&epic),
                Row::Subtask(subtask) => {
                    if !store.contains_epic(subtask.epic_id) {
                        return Err(TaskError::Storage(format!(
                            "line {}: subtask {} references missing epic {}",
                            line_no + 1,
                            subtask.id(),
                            subtask.epic_id
                        )));
                    }
                    let id = subtask.id();
                    let epic_id = subtask.epic_id;
                    store.update_subtask(&subtask);
                    store.link_subtask(epic_id, id);
                }
            }
        }
        store.resume_ids_after(max_id);

        info!(
            path = %path.display(),
            tasks = store.tasks().len(),
            epics = store.epics().len(),
            subtasks = store.subtasks().len(),
            "loaded board from file"
        );
        Ok(store)
    }
}

impl super::StorageBackend for FileBackend {
    fn persist(&mut self, store: &EntityStore) -> Result<(), TaskError> {
        let mut out = String::from(HEADER);
        out.push('\n');
        for task in store.tasks() {
            out.push_str(&encode_row(EntityKind::Task, &task, None));
            out.push('\n');
        }
        for epic in store.epics() {
            out.push_str(&encode_row(EntityKind::Epic, &epic.base, None));
            out.push('\n');
        }
        for subtask in store.subtasks() {
            out.push_str(&encode_row(
                EntityKind::Subtask,
                &subtask.base,
                Some(subtask.epic_id),
            ));
            out.push('\n');
        }
        fs::write(&self.path, out)
            .map_err(|e| TaskError::Storage(format!("cannot write {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "board saved");
        Ok(())
    }
}

fn encode_row(kind: EntityKind, base: &Task, epic_id: Option<TaskId>) -> String {
    let duration = base
        .duration_minutes
        .map(|m| m.to_string())
        .unwrap_or_default();
    let start = base
        .start_time
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    let epic = epic_id.map(|id| id.to_string()).unwrap_or_default();
    format!(
        "{},{},{},{},{},{},{},{}",
        base.id, kind, base.name, base.status, base.description, duration, start, epic
    )
}

enum Row {
    Task(Task),
    Epic(Epic),
    Subtask(Subtask),
}

fn row_id(row: &Row) -> TaskId {
    match row {
        Row::Task(task) => task.id,
        Row::Epic(epic) => epic.id(),
        Row::Subtask(subtask) => subtask.id(),
    }
}

fn decode_row(line: &str) -> Result<Row, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 7 {
        return Err(format!("expected at least 7 fields, got {}", fields.len()));
    }

    let id: TaskId = fields[0].parse().map_err(|_| format!("bad id: {}", fields[0]))?;
    let kind: EntityKind = fields[1].parse()?;
    let status: TaskStatus = fields[3].parse()?;
    let duration_minutes = match fields[5] {
        "" => None,
        raw => Some(raw.parse().map_err(|_| format!("bad duration: {raw}"))?),
    };
    let start_time = match fields[6] {
        "" => None,
        raw => Some(parse_start(raw)?),
    };

    let base = Task {
        id,
        name: fields[2].to_string(),
        description: fields[4].to_string(),
        status,
        duration_minutes,
        start_time,
    };

    match kind {
        EntityKind::Task => Ok(Row::Task(base)),
        EntityKind::Epic => Ok(Row::Epic(Epic {
            base,
            subtask_ids: Vec::new(),
            end_time: None,
        })),
        EntityKind::Subtask => {
            let raw = fields
                .get(7)
                .filter(|s| !s.is_empty())
                .ok_or("subtask row is missing its epic id")?;
            let epic_id = raw.parse().map_err(|_| format!("bad epic id: {raw}"))?;
            Ok(Row::Subtask(Subtask { base, epic_id }))
        }
    }
}

fn parse_start(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("bad start time {raw}: {e}"))
}
