//! Viewer selection state: platform, engine, search, sort, view mode

use serde::Serialize;

use crate::model::Platform;
use crate::prefs::{PreferenceStore, Preferences, ViewMode};
use crate::query::{EngineFilter, RankQuery, SortOrder};
use crate::Result;

/// Current viewer selection
///
/// Platform, engine and view mode are remembered across sessions; search
/// and sort order are not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub platform: Platform,
    pub engine: EngineFilter,
    pub search: String,
    pub sort: SortOrder,
    pub view_mode: ViewMode,
}

impl Selection {
    /// Start from remembered preferences
    pub fn restore(store: &dyn PreferenceStore) -> Self {
        let prefs = Preferences::load(store);
        Self {
            platform: prefs.platform,
            engine: prefs.engine,
            view_mode: prefs.view_mode,
            ..Self::default()
        }
    }

    /// Switch platform; engine filter and search are reset
    pub fn select_platform(&mut self, platform: Platform) {
        self.platform = platform;
        self.engine = EngineFilter::All;
        self.search.clear();
    }

    pub fn select_engine(&mut self, engine: EngineFilter) {
        self.engine = engine;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn to_query(&self) -> RankQuery {
        RankQuery {
            platform: self.platform,
            engine: self.engine.clone(),
            search: self.search.clone(),
            sort: self.sort,
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            platform: self.platform,
            engine: self.engine.clone(),
            view_mode: self.view_mode,
        }
    }

    /// Persist the remembered part of the selection
    pub fn remember(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        self.preferences().save(store)
    }
}
