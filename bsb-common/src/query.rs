//! Ranking and filtering over merged browser records
//!
//! Everything here is a pure function of its arguments. A ranking is
//! recomputed from scratch whenever the platform, engine filter, search term
//! or sort order changes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::model::{BrowserRecord, Platform, PlatformEntry, VersionScore};
use crate::{Error, Result};

/// Sentinel engine filter value meaning "no engine filter"
pub const ALL_ENGINES: &str = "All";

/// Engine filter: everything, or one exact engine name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EngineFilter {
    #[default]
    All,
    Engine(String),
}

impl EngineFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_ENGINES {
            EngineFilter::All
        } else {
            EngineFilter::Engine(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EngineFilter::All => ALL_ENGINES,
            EngineFilter::Engine(engine) => engine,
        }
    }

    pub fn matches(&self, engine: &str) -> bool {
        match self {
            EngineFilter::All => true,
            EngineFilter::Engine(wanted) => wanted == engine,
        }
    }
}

impl From<String> for EngineFilter {
    fn from(value: String) -> Self {
        EngineFilter::parse(&value)
    }
}

impl From<EngineFilter> for String {
    fn from(filter: EngineFilter) -> Self {
        filter.as_str().to_string()
    }
}

impl fmt::Display for EngineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Highest latest score first
    #[default]
    #[serde(rename = "desc", alias = "descending")]
    Descending,
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "alphabetical")]
    Alphabetical,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Descending => "desc",
            SortOrder::Ascending => "asc",
            SortOrder::Alphabetical => "alphabetical",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "desc" | "descending" => Ok(SortOrder::Descending),
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "alphabetical" | "name" => Ok(SortOrder::Alphabetical),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {}", other))),
        }
    }
}

/// Parameters of a ranking request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankQuery {
    pub platform: Platform,
    pub engine: EngineFilter,
    pub search: String,
    pub sort: SortOrder,
}

impl RankQuery {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    pub fn engine(mut self, engine: EngineFilter) -> Self {
        self.engine = engine;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// One row of a ranking
#[derive(Debug, Clone, Copy)]
pub struct RankedBrowser<'a> {
    /// 1-based position within the filtered, sorted result
    pub rank: usize,
    pub record: &'a BrowserRecord,
    pub entry: &'a PlatformEntry,
    /// Newest version; its Speedometer 3 score is `latest_score`
    pub latest: &'a VersionScore,
    pub latest_score: f64,
    /// Latest minus previous Speedometer 3 score, when both exist
    pub delta: Option<f64>,
}

impl RankedBrowser<'_> {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn engine(&self) -> &str {
        &self.entry.engine
    }
}

/// Summary statistics over the displayed rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Number of distinct engines present
    pub engines: usize,
}

/// Filtered, sorted, ranked view of one platform
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    pub platform: Platform,
    /// Records eligible on the platform before engine and search filters
    pub eligible: usize,
    pub entries: Vec<RankedBrowser<'a>>,
    /// `None` when no rows remain
    pub stats: Option<RankingStats>,
}

impl Ranking<'_> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }
}

/// Rank `records` on a platform with the query's filters and order
pub fn rank<'a>(records: &'a [BrowserRecord], query: &RankQuery) -> Ranking<'a> {
    let needle = query.search.trim().to_lowercase();

    let eligible: Vec<Eligible<'a>> = eligible_on(records, query.platform).collect();
    let eligible_count = eligible.len();

    let mut rows: Vec<RankedBrowser<'a>> = eligible
        .into_iter()
        .filter(|e| query.engine.matches(&e.entry.engine))
        .filter(|e| {
            needle.is_empty()
                || e.record.name.to_lowercase().contains(&needle)
                || e.entry.engine.to_lowercase().contains(&needle)
        })
        .map(|e| RankedBrowser {
            rank: 0,
            record: e.record,
            entry: e.entry,
            latest: e.latest,
            latest_score: e.score,
            delta: score_delta(e.entry),
        })
        .collect();

    // sort_by is stable: rows equal under the comparator keep input order
    rows.sort_by(|a, b| compare_rows(query.sort, a, b));

    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = position + 1;
    }

    let stats = compute_stats(&rows);

    Ranking {
        platform: query.platform,
        eligible: eligible_count,
        entries: rows,
        stats,
    }
}

/// `"All"` followed by the distinct engines of eligible records, first seen first
pub fn available_engines(records: &[BrowserRecord], platform: Platform) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut engines = vec![ALL_ENGINES.to_string()];
    for e in eligible_on(records, platform) {
        if !e.entry.engine.is_empty() && seen.insert(e.entry.engine.as_str()) {
            engines.push(e.entry.engine.clone());
        }
    }
    engines
}

/// Number of records rankable on a platform
pub fn eligible_count(records: &[BrowserRecord], platform: Platform) -> usize {
    eligible_on(records, platform).count()
}

/// Summary statistics over ranked rows, `None` when there are none
pub fn compute_stats(rows: &[RankedBrowser<'_>]) -> Option<RankingStats> {
    if rows.is_empty() {
        return None;
    }

    let scores = rows.iter().map(|r| r.latest_score);
    let sum: f64 = scores.clone().sum();
    let min = scores.clone().fold(f64::INFINITY, f64::min);
    let max = scores.fold(f64::NEG_INFINITY, f64::max);
    let engines: HashSet<&str> = rows.iter().map(|r| r.engine()).collect();

    Some(RankingStats {
        count: rows.len(),
        mean: sum / rows.len() as f64,
        min,
        max,
        engines: engines.len(),
    })
}

struct Eligible<'a> {
    record: &'a BrowserRecord,
    entry: &'a PlatformEntry,
    latest: &'a VersionScore,
    score: f64,
}

/// Records with a non-empty history and a numeric latest score
fn eligible_on(records: &[BrowserRecord], platform: Platform) -> impl Iterator<Item = Eligible<'_>> {
    records.iter().filter_map(move |record| {
        let entry = record.on(platform)?;
        let latest = entry.latest()?;
        let score = latest.scores.speedometer3?;
        Some(Eligible {
            record,
            entry,
            latest,
            score,
        })
    })
}

fn score_delta(entry: &PlatformEntry) -> Option<f64> {
    let latest = entry.latest()?.scores.speedometer3?;
    let previous = entry.previous()?.scores.speedometer3?;
    Some(latest - previous)
}

/// Numeric ties fall back to name order
fn compare_rows(sort: SortOrder, a: &RankedBrowser<'_>, b: &RankedBrowser<'_>) -> Ordering {
    match sort {
        SortOrder::Descending => b
            .latest_score
            .total_cmp(&a.latest_score)
            .then_with(|| a.name().cmp(b.name())),
        SortOrder::Ascending => a
            .latest_score
            .total_cmp(&b.latest_score)
            .then_with(|| a.name().cmp(b.name())),
        SortOrder::Alphabetical => a
            .name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name())),
    }
}
