//! Viewer preference endpoints

use axum::{extract::State, Json};
use bsb_common::prefs::{Preferences, ViewMode};
use serde::Deserialize;
use tracing::info;

use super::request_selection;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/preferences
pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    let prefs = state.prefs.lock().await;
    Json(Preferences::load(&**prefs))
}

/// Partial update; omitted fields keep their stored value
#[derive(Debug, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub platform: Option<String>,
    pub engine: Option<String>,
    pub view_mode: Option<String>,
}

/// PUT /api/preferences
///
/// Changing platform without naming an engine resets the engine to "All".
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> ApiResult<Json<Preferences>> {
    let mut selection =
        request_selection(&state, update.platform.as_deref(), update.engine.as_deref()).await?;
    if let Some(mode) = update.view_mode.as_deref() {
        selection.view_mode = ViewMode::parse(mode)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown view mode: {}", mode)))?;
    }

    let mut prefs = state.prefs.lock().await;
    selection.remember(&mut **prefs)?;
    info!(
        "Preferences saved: platform={} engine={} view_mode={}",
        selection.platform,
        selection.engine,
        selection.view_mode.as_str()
    );

    Ok(Json(selection.preferences()))
}
