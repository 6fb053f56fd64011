//! Browser detail and comparison endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use bsb_common::projection::{compare, Comparison};
use bsb_common::{project, rank, BrowserView, RankQuery};
use serde::Deserialize;

use super::request_selection;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BrowserQuery {
    pub platform: Option<String>,
}

/// GET /api/browsers/:name
///
/// Detail view of one browser on a platform. The rank is the browser's
/// position in the unfiltered ranking, absent if it has no score there.
pub async fn get_browser(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<BrowserQuery>,
) -> ApiResult<Json<BrowserView>> {
    let platform = request_selection(&state, params.platform.as_deref(), None)
        .await?
        .platform;
    let dataset = state.ready_dataset().await?;

    let record = dataset
        .find(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Browser '{}'", name)))?;

    let position = rank(&dataset.records, &RankQuery::for_platform(platform))
        .entries
        .iter()
        .find(|row| row.name() == name)
        .map(|row| row.rank);

    project(record, platform, position)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No data for '{}' on {}", name, platform)))
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub platform: Option<String>,
    /// Comma-separated browser names; the first found is the baseline
    #[serde(default)]
    pub names: String,
}

/// GET /api/compare
pub async fn compare_browsers(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
) -> ApiResult<Json<Comparison>> {
    let names: Vec<String> = params
        .names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect();
    if names.is_empty() {
        return Err(ApiError::BadRequest(
            "names must list at least one browser".to_string(),
        ));
    }

    let platform = request_selection(&state, params.platform.as_deref(), None)
        .await?
        .platform;
    let dataset = state.ready_dataset().await?;

    Ok(Json(compare(&dataset.records, platform, &names)))
}
