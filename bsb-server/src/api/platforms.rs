//! Platform tab listing

use axum::{extract::State, Json};
use bsb_common::model::Freshness;
use bsb_common::query::eligible_count;
use bsb_common::{Platform, ViewStatus};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlatformInfo {
    pub key: Platform,
    pub display_name: String,
    pub freshness: Freshness,
    /// Browsers with a score on this platform; `None` until a dataset is loaded
    pub eligible: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PlatformsResponse {
    pub state: ViewStatus,
    /// Remembered platform selection
    pub selected: Platform,
    pub platforms: Vec<PlatformInfo>,
}

/// GET /api/platforms
///
/// Platforms in tab order.
pub async fn list_platforms(State(state): State<AppState>) -> ApiResult<Json<PlatformsResponse>> {
    let selection = super::request_selection(&state, None, None).await?;
    let load_state = state.session.state().await;
    let dataset = load_state.dataset();

    let platforms = Platform::TAB_ORDER
        .iter()
        .map(|&platform| PlatformInfo {
            key: platform,
            display_name: platform.display_name().to_string(),
            freshness: platform.freshness(),
            eligible: dataset.map(|d| eligible_count(&d.records, platform)),
        })
        .collect();

    Ok(Json(PlatformsResponse {
        state: load_state.status(),
        selected: selection.platform,
        platforms,
    }))
}
