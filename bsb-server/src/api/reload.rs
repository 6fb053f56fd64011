//! Dataset reload (retry) endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::AppState;

/// POST /api/reload
///
/// Starts a full reload and returns immediately. A reload started later
/// supersedes this one; progress is visible through `/api/rankings`.
pub async fn reload_dataset(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    info!("Dataset reload requested");
    // Detached; the session publishes the result
    drop(state.session.spawn_reload());

    (StatusCode::ACCEPTED, Json(json!({ "status": "reloading" })))
}
