//! # Browser Scoreboard Common Library
//!
//! Data pipeline behind the browser benchmark scoreboard:
//! - Data model for browsers, platforms and benchmark scores
//! - Dataset loading from disk or HTTP
//! - Merging per-platform documents into unified records
//! - Ranking, filtering and summary statistics
//! - Projection into presentation-ready shapes
//! - Load session with last-request-wins reloads
//! - Viewer preferences and configuration loading

pub mod config;
pub mod error;
pub mod loader;
pub mod merge;
pub mod model;
pub mod prefs;
pub mod projection;
pub mod query;
pub mod selection;
pub mod session;

pub use error::{Error, Result};
pub use loader::{DataSource, Loader};
pub use merge::Dataset;
pub use model::{BrowserRecord, EngineKind, Platform, PlatformEntry, Scores, VersionScore};
pub use projection::{project, BrowserView};
pub use query::{rank, EngineFilter, RankQuery, Ranking, SortOrder};
pub use session::{DatasetSession, LoadState, ReloadOutcome, ViewStatus};
