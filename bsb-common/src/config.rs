//! Configuration loading and data source resolution
//!
//! Resolution priority for the data source:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`BSB_DATA_URL`, then `BSB_DATA_DIR`)
//! 3. TOML config file
//! 4. Compiled default (`./public/data`)
//!
//! A missing config file is not an error: defaults are used and a warning
//! is logged.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::loader::{DataSource, DEFAULT_TIMEOUT_SECS};
use crate::{Error, Result};

pub const ENV_DATA_DIR: &str = "BSB_DATA_DIR";
pub const ENV_DATA_URL: &str = "BSB_DATA_URL";

/// Default HTTP port for bsb-server
pub const DEFAULT_PORT: u16 = 5740;

/// Default on-disk dataset location, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "public/data";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where viewer preferences are stored (optional)
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Filesystem,
    Network,
}

/// `[data]` section
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: SourceKind,

    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default)]
    pub base_url: Option<String>,

    /// Network read timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            dir: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the platform config
    /// location is tried and defaults are used if nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!("Config file not found: {}", path.display())));
                }
                Self::from_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                Some(path) => {
                    warn!("No config file at {}, using defaults", path.display());
                    Ok(Self::default())
                }
                None => {
                    warn!("Could not determine config directory, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Resolve where dataset documents come from
    ///
    /// `cli_dir` and `cli_url` are mutually exclusive.
    pub fn resolve_data_source(
        &self,
        cli_dir: Option<&Path>,
        cli_url: Option<&str>,
    ) -> Result<DataSource> {
        // Priority 1: Command-line argument
        match (cli_dir, cli_url) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "Specify either a data directory or a data URL, not both".to_string(),
                ))
            }
            (Some(dir), None) => return Ok(filesystem(dir)),
            (None, Some(url)) => return network(url),
            (None, None) => {}
        }

        // Priority 2: Environment variable
        if let Ok(url) = std::env::var(ENV_DATA_URL) {
            if !url.trim().is_empty() {
                return network(&url);
            }
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                return Ok(filesystem(Path::new(&dir)));
            }
        }

        // Priority 3: TOML config file
        match self.data.source {
            SourceKind::Network => match self.data.base_url.as_deref() {
                Some(url) => network(url),
                None => Err(Error::Config(
                    "data.source = \"network\" requires data.base_url".to_string(),
                )),
            },
            SourceKind::Filesystem => match self.data.dir.as_deref() {
                Some(dir) => Ok(filesystem(dir)),
                // Priority 4: compiled default
                None => Ok(filesystem(Path::new(DEFAULT_DATA_DIR))),
            },
        }
    }

    /// Where preferences are stored
    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join("bsb").join("preferences.toml"))
                .unwrap_or_else(|| PathBuf::from("bsb-preferences.toml"))
        })
    }
}

/// Platform config file location (`<config_dir>/bsb/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bsb").join("config.toml"))
}

fn filesystem(dir: &Path) -> DataSource {
    DataSource::Filesystem {
        dir: dir.to_path_buf(),
    }
}

fn network(url: &str) -> Result<DataSource> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!("Data URL must be http(s): {}", url)));
    }
    Ok(DataSource::Network {
        base_url: url.trim_end_matches('/').to_string(),
    })
}
