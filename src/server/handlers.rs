use crate::error::TaskError;
use crate::task::{Epic, Subtask, Task, TaskId, WorkItem};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use super::AppState;

type ApiError = (StatusCode, String);

/// Unknown id maps to 404, a scheduling conflict to 406, and everything
/// else degrades to an opaque 500 without leaking internals.
fn error_response(err: TaskError) -> ApiError {
    match err {
        TaskError::NotFound { .. } | TaskError::UnknownEpic(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        TaskError::ScheduleConflict => (StatusCode::NOT_ACCEPTABLE, err.to_string()),
        TaskError::Storage(_) => {
            error!("request failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

fn deleted(id: TaskId) -> Json<Value> {
    Json(json!({ "deleted": id }))
}

// --- tasks ------------------------------------------------------------------

pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.manager.lock().await.tasks())
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    state
        .manager
        .lock()
        .await
        .get_task(id)
        .map(Json)
        .map_err(error_response)
}

pub async fn upsert_task(
    State(state): State<Arc<AppState>>,
    Json(mut task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let mut manager = state.manager.lock().await;
    if task.id == 0 {
        manager.create_task(&mut task).map_err(error_response)?;
        Ok((StatusCode::CREATED, Json(task)))
    } else {
        manager.update_task(&task).map_err(error_response)?;
        Ok((StatusCode::OK, Json(task)))
    }
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state
        .manager
        .lock()
        .await
        .delete_task(id)
        .map(|_| deleted(id))
        .map_err(error_response)
}

pub async fn clear_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state
        .manager
        .lock()
        .await
        .clear_tasks()
        .map(|_| Json(json!({ "cleared": "tasks" })))
        .map_err(error_response)
}

// --- epics ------------------------------------------------------------------

pub async fn list_epics(State(state): State<Arc<AppState>>) -> Json<Vec<Epic>> {
    Json(state.manager.lock().await.epics())
}

pub async fn get_epic(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Epic>, ApiError> {
    state
        .manager
        .lock()
        .await
        .get_epic(id)
        .map(Json)
        .map_err(error_response)
}

pub async fn upsert_epic(
    State(state): State<Arc<AppState>>,
    Json(mut epic): Json<Epic>,
) -> Result<(StatusCode, Json<Epic>), ApiError> {
    let mut manager = state.manager.lock().await;
    if epic.id() == 0 {
        manager.create_epic(&mut epic).map_err(error_response)?;
        Ok((StatusCode::CREATED, Json(epic)))
    } else {
        manager.update_epic(&epic).map_err(error_response)?;
        Ok((StatusCode::OK, Json(epic)))
    }
}

pub async fn delete_epic(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state
        .manager
        .lock()
        .await
        .delete_epic(id)
        .map(|_| deleted(id))
        .map_err(error_response)
}

pub async fn clear_epics(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state
        .manager
        .lock()
        .await
        .clear_epics()
        .map(|_| Json(json!({ "cleared": "epics" })))
        .map_err(error_response)
}

pub async fn epic_subtasks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Vec<Subtask>>, ApiError> {
    state
        .manager
        .lock()
        .await
        .epic_subtasks(id)
        .map(Json)
        .map_err(error_response)
}

// --- subtasks ---------------------------------------------------------------

pub async fn list_subtasks(State(state): State<Arc<AppState>>) -> Json<Vec<Subtask>> {
    Json(state.manager.lock().await.subtasks())
}

pub async fn get_subtask(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Subtask>, ApiError> {
    state
        .manager
        .lock()
        .await
        .get_subtask(id)
        .map(Json)
        .map_err(error_response)
}

pub async fn upsert_subtask(
    State(state): State<Arc<AppState>>,
    Json(mut subtask): Json<Subtask>,
) -> Result<(StatusCode, Json<Subtask>), ApiError> {
    let mut manager = state.manager.lock().await;
    if subtask.id() == 0 {
        manager.create_subtask(&mut subtask).map_err(error_response)?;
        Ok((StatusCode::CREATED, Json(subtask)))
    } else {
        manager.update_subtask(&subtask).map_err(error_response)?;
        Ok((StatusCode::OK, Json(subtask)))
    }
}

pub async fn delete_subtask(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state
        .manager
        .lock()
        .await
        .delete_subtask(id)
        .map(|_| deleted(id))
        .map_err(error_response)
}

pub async fn clear_subtasks(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state
        .manager
        .lock()
        .await
        .clear_subtasks()
        .map(|_| Json(json!({ "cleared": "subtasks" })))
        .map_err(error_response)
}

// --- views ------------------------------------------------------------------

pub async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<WorkItem>> {
    Json(state.manager.lock().await.history())
}

pub async fn prioritized(State(state): State<Arc<AppState>>) -> Json<Vec<WorkItem>> {
    Json(state.manager.lock().await.prioritized())
}
