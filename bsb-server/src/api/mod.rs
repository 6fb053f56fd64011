//! HTTP API handlers for bsb-server

pub mod browsers;
pub mod buildinfo;
pub mod health;
pub mod platforms;
pub mod preferences;
pub mod rankings;
pub mod reload;

pub use browsers::{compare_browsers, get_browser};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use platforms::list_platforms;
pub use preferences::{get_preferences, update_preferences};
pub use rankings::{get_engines, get_rankings};
pub use reload::reload_dataset;

use bsb_common::selection::Selection;
use bsb_common::{EngineFilter, Platform};

use crate::error::ApiResult;
use crate::AppState;

/// Selection for a request: remembered preferences overridden by query parameters
///
/// Naming a different platform resets the engine filter, as switching
/// platform tabs does.
pub(crate) async fn request_selection(
    state: &AppState,
    platform: Option<&str>,
    engine: Option<&str>,
) -> ApiResult<Selection> {
    let mut selection = {
        let prefs = state.prefs.lock().await;
        Selection::restore(&**prefs)
    };

    if let Some(platform) = platform.filter(|p| !p.is_empty()) {
        let platform: Platform = platform.parse()?;
        if platform != selection.platform {
            selection.select_platform(platform);
        }
    }
    if let Some(engine) = engine {
        selection.select_engine(EngineFilter::parse(engine));
    }

    Ok(selection)
}
