//! Dataset loading from disk or over HTTP
//!
//! A load reads the canonical browser list plus one document per platform.
//! All reads run concurrently and the load succeeds only if every one of
//! them does.
//!
//! Documents must be JSON arrays. Elements are decoded one at a time, so a
//! single malformed element is skipped (and counted) instead of failing the
//! whole document.

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::model::{Platform, VersionScore};
use crate::{Error, Result};

/// Name of the canonical browser list
pub const CANONICAL_FILE: &str = "browsers.json";

/// Default timeout for network reads
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Entry of the canonical browser list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CanonicalEntry {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub website: String,
}

/// Entry of a per-platform document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformDocEntry {
    pub name: String,
    #[serde(default = "unknown_engine")]
    pub engine: String,
    pub versions: Vec<VersionScore>,
}

fn unknown_engine() -> String {
    "unknown".to_string()
}

/// Parsed but not yet merged load result
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub browsers: Vec<CanonicalEntry>,
    /// One document per platform, in `Platform::ALL` order
    pub platforms: Vec<(Platform, Vec<PlatformDocEntry>)>,
    /// Number of elements skipped because they were malformed
    pub skipped: usize,
}

/// Where dataset documents are read from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Directory containing `browsers.json` and `<platform>.json`
    Filesystem { dir: PathBuf },
    /// Base URL under which the same documents are served
    Network { base_url: String },
}

impl DataSource {
    /// Human-readable location of a named resource
    pub fn locate(&self, file_name: &str) -> String {
        match self {
            DataSource::Filesystem { dir } => dir.join(file_name).display().to_string(),
            DataSource::Network { base_url } => {
                format!("{}/{}", base_url.trim_end_matches('/'), file_name)
            }
        }
    }
}

/// Reads and parses every dataset document from a [`DataSource`]
#[derive(Debug, Clone)]
pub struct Loader {
    source: DataSource,
    client: reqwest::Client,
}

impl Loader {
    pub fn new(source: DataSource) -> Self {
        Self::with_timeout(source, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(source: DataSource, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout ({}), using defaults", e);
                reqwest::Client::new()
            });
        Self { source, client }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Load every document, failing as a whole if any one fails
    pub async fn load(&self) -> Result<RawDataset> {
        info!("Loading dataset from {:?}", self.source);

        let platform_reads = Platform::ALL.into_iter().map(|platform| async move {
            let (entries, skipped) = self
                .read_array::<PlatformDocEntry>(&platform.data_file())
                .await?;
            Ok::<_, Error>((platform, entries, skipped))
        });

        let (canonical, platform_docs) = tokio::try_join!(
            self.read_array::<CanonicalEntry>(CANONICAL_FILE),
            try_join_all(platform_reads),
        )?;

        let (browsers, mut skipped) = canonical;
        let mut platforms = Vec::with_capacity(platform_docs.len());
        for (platform, entries, doc_skipped) in platform_docs {
            skipped += doc_skipped;
            platforms.push((platform, entries));
        }

        info!(
            "Loaded {} browsers across {} platforms ({} malformed entries skipped)",
            browsers.len(),
            platforms.len(),
            skipped
        );

        Ok(RawDataset {
            browsers,
            platforms,
            skipped,
        })
    }

    async fn read_array<T: DeserializeOwned>(&self, file_name: &str) -> Result<(Vec<T>, usize)> {
        let text = self.read_text(file_name).await?;
        parse_array(file_name, &text)
    }

    async fn read_text(&self, file_name: &str) -> Result<String> {
        let location = self.source.locate(file_name);
        debug!("Reading {}", location);

        match &self.source {
            DataSource::Filesystem { dir } => tokio::fs::read_to_string(dir.join(file_name))
                .await
                .map_err(|e| Error::unavailable(location, e)),
            DataSource::Network { .. } => {
                let response = self
                    .client
                    .get(&location)
                    .send()
                    .await
                    .map_err(|e| Error::unavailable(&location, e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::unavailable(location, format!("HTTP {}", status)));
                }

                response
                    .text()
                    .await
                    .map_err(|e| Error::unavailable(location, e))
            }
        }
    }
}

/// Parse a JSON array document, skipping elements that do not decode as `T`
///
/// Returns the decoded elements and the number skipped. A document that is
/// not valid JSON, or not an array, is `DataUnavailable`.
pub fn parse_array<T: DeserializeOwned>(resource: &str, text: &str) -> Result<(Vec<T>, usize)> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::unavailable(resource, e))?;

    let serde_json::Value::Array(items) = value else {
        return Err(Error::unavailable(resource, "expected a JSON array"));
    };

    let mut parsed = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(entry) => parsed.push(entry),
            Err(e) => {
                warn!("Skipping malformed entry {} in {}: {}", index, resource, e);
                skipped += 1;
            }
        }
    }

    Ok((parsed, skipped))
}
