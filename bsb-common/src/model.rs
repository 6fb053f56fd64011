//! Browser benchmark data model
//!
//! Records are built once by the merger and shared read-only afterwards.
//! Platform slots are explicit: every record carries one slot per
//! [`Platform`], either an entry or an absence.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Platform a benchmark was run on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    #[default]
    MacosArm,
    MacosIntel,
    Windows,
    Android,
    Ipad,
}

/// How recent a platform's benchmark data is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Recently re-benchmarked
    Fresh,
    Current,
    /// Benchmarks are known to lag behind current browser releases
    Outdated,
}

impl Platform {
    /// All platforms, in dataset load order
    pub const ALL: [Platform; 5] = [
        Platform::MacosArm,
        Platform::MacosIntel,
        Platform::Windows,
        Platform::Android,
        Platform::Ipad,
    ];

    /// Order in which platforms are offered for selection
    pub const TAB_ORDER: [Platform; 5] = [
        Platform::MacosArm,
        Platform::Android,
        Platform::Ipad,
        Platform::Windows,
        Platform::MacosIntel,
    ];

    /// Stable key used in data file names and query parameters
    pub fn key(self) -> &'static str {
        match self {
            Platform::MacosArm => "macos-arm",
            Platform::MacosIntel => "macos-intel",
            Platform::Windows => "windows",
            Platform::Android => "android",
            Platform::Ipad => "ipad",
        }
    }

    /// Human-readable platform name
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::MacosArm => "macOS ARM",
            Platform::MacosIntel => "macOS Intel",
            Platform::Windows => "Windows",
            Platform::Android => "Android",
            Platform::Ipad => "iPad OS",
        }
    }

    pub fn freshness(self) -> Freshness {
        match self {
            Platform::MacosArm => Freshness::Fresh,
            Platform::Android | Platform::MacosIntel => Freshness::Outdated,
            Platform::Windows | Platform::Ipad => Freshness::Current,
        }
    }

    /// Name of the per-platform dataset file
    pub fn data_file(self) -> String {
        format!("{}.json", self.key())
    }

    fn index(self) -> usize {
        match self {
            Platform::MacosArm => 0,
            Platform::MacosIntel => 1,
            Platform::Windows => 2,
            Platform::Android => 3,
            Platform::Ipad => 4,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Platform::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown platform: {}", s)))
    }
}

/// Display bucket for a browser engine
///
/// Any engine string maps to exactly one bucket; unrecognized engines land
/// in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EngineKind {
    Blink,
    Gecko,
    WebKit,
    Other,
}

impl EngineKind {
    pub fn classify(engine: &str) -> Self {
        match engine.trim().to_ascii_lowercase().as_str() {
            "blink" => EngineKind::Blink,
            "gecko" => EngineKind::Gecko,
            "webkit" => EngineKind::WebKit,
            _ => EngineKind::Other,
        }
    }
}

/// Benchmark scores for one browser version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Speedometer 3 score, the ranking metric (higher is better)
    #[serde(default, deserialize_with = "lenient_number")]
    pub speedometer3: Option<f64>,

    /// Memory usage in megabytes (lower is better)
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub ram: Option<f64>,

    /// Ad-blocking effectiveness, 0-100 (higher is better)
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub adblock: Option<f64>,
}

/// Scores recorded for a single browser release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionScore {
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    pub scores: Scores,
}

impl VersionScore {
    /// Release date parsed as `YYYY-MM-DD`
    pub fn released_on(&self) -> Option<NaiveDate> {
        self.release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }
}

/// A browser's benchmark history on one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformEntry {
    pub engine: String,

    /// Newest first. Upstream order is preserved as-is.
    pub versions: Vec<VersionScore>,
}

impl PlatformEntry {
    pub fn latest(&self) -> Option<&VersionScore> {
        self.versions.first()
    }

    pub fn previous(&self) -> Option<&VersionScore> {
        self.versions.get(1)
    }

    /// Latest Speedometer 3 score, if the entry is rankable
    pub fn latest_score(&self) -> Option<f64> {
        self.latest().and_then(|v| v.scores.speedometer3)
    }

    pub fn engine_kind(&self) -> EngineKind {
        EngineKind::classify(&self.engine)
    }
}

/// One slot per platform: an entry or an explicit absence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformTable {
    slots: [Option<PlatformEntry>; 5],
}

impl PlatformTable {
    pub fn get(&self, platform: Platform) -> Option<&PlatformEntry> {
        self.slots[platform.index()].as_ref()
    }

    pub fn set(&mut self, platform: Platform, entry: Option<PlatformEntry>) {
        self.slots[platform.index()] = entry;
    }

    /// Iterate every platform with its slot, absent ones included
    pub fn iter(&self) -> impl Iterator<Item = (Platform, Option<&PlatformEntry>)> {
        Platform::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

impl Serialize for PlatformTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(Platform::ALL.len()))?;
        for (platform, entry) in self.iter() {
            map.serialize_entry(platform.key(), &entry)?;
        }
        map.end()
    }
}

/// A browser with its benchmark data on every platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowserRecord {
    pub name: String,
    pub logo: String,
    pub website: String,
    pub platforms: PlatformTable,
}

impl BrowserRecord {
    pub fn on(&self, platform: Platform) -> Option<&PlatformEntry> {
        self.platforms.get(platform)
    }
}

/// Accept any JSON value; keep it only if it is a finite number
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|n| n.is_finite()))
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected version string, got {}", other))),
    }
}
