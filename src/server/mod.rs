//! HTTP facade over the task manager.
//!
//! ## Endpoints
//!
//! - `GET /tasks`, `GET /tasks/:id`: list / fetch (fetch records history)
//! - `POST /tasks`: upsert; a zero id creates (201), non-zero updates (200)
//! - `DELETE /tasks`, `DELETE /tasks/:id`: delete all / one
//! - same trio for `/epics` and `/subtasks`
//! - `GET /epics/:id/subtasks`: an epic's current subtasks
//! - `GET /history`: recency-ordered access log
//! - `GET /prioritized`: timed items ascending by start
//!
//! The manager is not internally synchronized, so all access goes through
//! a single mutex; that is the single-writer discipline the core requires
//! behind a pooled executor.

mod handlers;

use crate::task::TaskManager;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct AppState {
    pub(crate) manager: Mutex<TaskManager>,
}

pub fn router(manager: TaskManager) -> Router {
    let state = Arc::new(AppState {
        manager: Mutex::new(manager),
    });

    Router::new()
        .route(
            "/tasks",
            get(handlers::list_tasks)
                .post(handlers::upsert_task)
                .delete(handlers::clear_tasks),
        )
        .route(
            "/tasks/:id",
            get(handlers::get_task).delete(handlers::delete_task),
        )
        .route(
            "/epics",
            get(handlers::list_epics)
                .post(handlers::upsert_epic)
                .delete(handlers::clear_epics),
        )
        .route(
            "/epics/:id",
            get(handlers::get_epic).delete(handlers::delete_epic),
        )
        .route("/epics/:id/subtasks", get(handlers::epic_subtasks))
        .route(
            "/subtasks",
            get(handlers::list_subtasks)
                .post(handlers::upsert_subtask)
                .delete(handlers::clear_subtasks),
        )
        .route(
            "/subtasks/:id",
            get(handlers::get_subtask).delete(handlers::delete_subtask),
        )
        .route("/history", get(handlers::history))
        .route("/prioritized", get(handlers::prioritized))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(manager: TaskManager, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(manager);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
