//! Ranking and engine filter endpoints
//!
//! Both endpoints answer 200 in every load state and report the state in
//! the body, so a client can tell loading, failure and an empty result apart.

use axum::{
    extract::{Query, State},
    Json,
};
use bsb_common::projection::{chart, project_ranking, ChartBar};
use bsb_common::query::{available_engines, RankingStats, ALL_ENGINES};
use bsb_common::{rank, BrowserView, EngineFilter, LoadState, Platform, SortOrder, ViewStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::request_selection;
use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for GET /api/rankings
///
/// Platform and engine default to the remembered preferences.
#[derive(Debug, Default, Deserialize)]
pub struct RankingsQuery {
    pub platform: Option<String>,
    pub engine: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub state: ViewStatus,
    /// Load failure message when `state` is `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub platform: Platform,
    pub engine: EngineFilter,
    pub search: String,
    pub sort: SortOrder,
    /// Browsers with a score on the platform before engine and search filters
    pub eligible: usize,
    pub stats: Option<RankingStats>,
    pub browsers: Vec<BrowserView>,
    pub chart: Vec<ChartBar>,
}

/// GET /api/rankings
pub async fn get_rankings(
    State(state): State<AppState>,
    Query(params): Query<RankingsQuery>,
) -> ApiResult<Json<RankingsResponse>> {
    let mut selection =
        request_selection(&state, params.platform.as_deref(), params.engine.as_deref()).await?;
    if let Some(search) = params.search {
        selection.set_search(search);
    }
    if let Some(sort) = params.sort.as_deref() {
        selection.sort = sort.parse()?;
    }

    let mut response = RankingsResponse {
        state: ViewStatus::Loading,
        message: None,
        platform: selection.platform,
        engine: selection.engine.clone(),
        search: selection.search.clone(),
        sort: selection.sort,
        eligible: 0,
        stats: None,
        browsers: Vec::new(),
        chart: Vec::new(),
    };

    let dataset = match state.session.state().await {
        LoadState::Ready(dataset) => dataset,
        LoadState::Loading => return Ok(Json(response)),
        LoadState::Failed(message) => {
            response.state = ViewStatus::Error;
            response.message = Some(message);
            return Ok(Json(response));
        }
    };

    let ranking = rank(&dataset.records, &selection.to_query());
    debug!(
        "Ranked {} of {} browsers on {}",
        ranking.len(),
        ranking.eligible,
        ranking.platform
    );

    response.state = ViewStatus::for_ranking(&ranking);
    response.eligible = ranking.eligible;
    response.browsers = project_ranking(&ranking);
    response.chart = chart(&ranking);
    response.stats = ranking.stats;

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct EnginesQuery {
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnginesResponse {
    pub state: ViewStatus,
    pub platform: Platform,
    /// `"All"` followed by the engines present on the platform
    pub engines: Vec<String>,
}

/// GET /api/engines
pub async fn get_engines(
    State(state): State<AppState>,
    Query(params): Query<EnginesQuery>,
) -> ApiResult<Json<EnginesResponse>> {
    let selection = request_selection(&state, params.platform.as_deref(), None).await?;
    let load_state = state.session.state().await;

    let engines = match load_state.dataset() {
        Some(dataset) => available_engines(&dataset.records, selection.platform),
        None => vec![ALL_ENGINES.to_string()],
    };

    Ok(Json(EnginesResponse {
        state: load_state.status(),
        platform: selection.platform,
        engines,
    }))
}
