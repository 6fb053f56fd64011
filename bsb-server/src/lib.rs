//! bsb-server library - Browser scoreboard HTTP service
//!
//! Read-only JSON API over the benchmark dataset: rankings, browser details,
//! comparisons and viewer preferences. Rendering is left to the client.

use axum::Router;
use bsb_common::prefs::PreferenceStore;
use bsb_common::{Dataset, DatasetSession, LoadState};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod error;

use error::{ApiError, ApiResult};

/// Shared preference store
pub type SharedPreferences = Arc<Mutex<Box<dyn PreferenceStore>>>;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Dataset load session (last-request-wins reloads)
    pub session: Arc<DatasetSession>,
    /// Remembered viewer preferences
    pub prefs: SharedPreferences,
}

impl AppState {
    pub fn new(session: Arc<DatasetSession>, prefs: Box<dyn PreferenceStore>) -> Self {
        Self {
            session,
            prefs: Arc::new(Mutex::new(prefs)),
        }
    }

    /// The published dataset, or 503 while loading or after a failed load
    pub async fn ready_dataset(&self) -> ApiResult<Arc<Dataset>> {
        match self.session.state().await {
            LoadState::Ready(dataset) => Ok(dataset),
            LoadState::Loading => Err(ApiError::Unavailable("Dataset is loading".to_string())),
            LoadState::Failed(message) => Err(ApiError::Unavailable(message)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/platforms", get(api::list_platforms))
        .route("/api/rankings", get(api::get_rankings))
        .route("/api/engines", get(api::get_engines))
        .route("/api/browsers/:name", get(api::get_browser))
        .route("/api/compare", get(api::compare_browsers))
        .route("/api/reload", post(api::reload_dataset))
        .route(
            "/api/preferences",
            get(api::get_preferences).put(api::update_preferences),
        );

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
