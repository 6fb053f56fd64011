//! Persisted viewer preferences
//!
//! Preferences live behind the [`PreferenceStore`] trait and are passed in
//! explicitly; nothing here reads ambient global state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::model::Platform;
use crate::query::EngineFilter;
use crate::{Error, Result};

pub const KEY_PLATFORM: &str = "selectedPlatform";
pub const KEY_ENGINE: &str = "selectedEngine";
pub const KEY_VIEW_MODE: &str = "viewMode";

/// Simple string key-value store with explicit persistence
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    /// Write pending changes to durable storage
    fn persist(&self) -> Result<()>;
}

/// Non-persistent store, for tests and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn persist(&self) -> Result<()> {
        Ok(())
    }
}

/// Store backed by a flat TOML file of string values
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlPreferenceStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                Error::Preferences(format!("Invalid preferences file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string(&self.values)
            .map_err(|e| Error::Preferences(format!("Failed to encode preferences: {}", e)))?;
        std::fs::write(&self.path, content)?;
        debug!("Preferences written to {}", self.path.display());
        Ok(())
    }
}

/// Card grid or compact list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

/// Typed view of the stored preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub platform: Platform,
    pub engine: EngineFilter,
    pub view_mode: ViewMode,
}

impl Preferences {
    /// Read preferences, falling back to defaults for missing or invalid values
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();

        let platform = match store.get(KEY_PLATFORM) {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!("Stored platform '{}' is invalid, using {}", value, defaults.platform);
                defaults.platform
            }),
            None => defaults.platform,
        };

        let engine = store
            .get(KEY_ENGINE)
            .map(|value| EngineFilter::parse(&value))
            .unwrap_or_default();

        let view_mode = match store.get(KEY_VIEW_MODE) {
            Some(value) => ViewMode::parse(&value).unwrap_or_else(|| {
                warn!("Stored view mode '{}' is invalid, using grid", value);
                defaults.view_mode
            }),
            None => defaults.view_mode,
        };

        Self {
            platform,
            engine,
            view_mode,
        }
    }

    /// Write into the store and persist it
    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        store.set(KEY_PLATFORM, self.platform.key());
        store.set(KEY_ENGINE, self.engine.as_str());
        store.set(KEY_VIEW_MODE, self.view_mode.as_str());
        store.persist()
    }
}
