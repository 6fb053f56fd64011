//! Presentation-ready shapes derived from records and rankings
//!
//! Projection never re-derives ranking rules and never mutates its input.

use serde::Serialize;

use crate::model::{BrowserRecord, EngineKind, Platform, PlatformEntry, VersionScore};
use crate::query::{RankedBrowser, Ranking};

/// Everything a card or detail view shows for one browser on one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowserView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    pub engine: String,
    pub engine_kind: EngineKind,
    pub logo: String,
    pub website: String,
    pub latest_version: String,
    /// `None` when the latest version has no usable score
    pub latest_score: Option<f64>,
    pub previous_score: Option<f64>,
    pub delta: Option<f64>,
    /// Change relative to the previous version, in percent
    pub trend_percent: Option<f64>,
    pub ram: Option<f64>,
    pub adblock: Option<f64>,
    /// Oldest first, as time-series charts expect
    pub version_history: Vec<VersionPoint>,
}

/// One point of a browser's score history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionPoint {
    pub version: String,
    pub speedometer3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adblock: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl From<&VersionScore> for VersionPoint {
    fn from(v: &VersionScore) -> Self {
        Self {
            version: v.version.clone(),
            speedometer3: v.scores.speedometer3,
            ram: v.scores.ram,
            adblock: v.scores.adblock,
            release_date: v.release_date.clone(),
        }
    }
}

/// Project a record on a platform
///
/// Returns `None` when the record has no entry, or an empty history, on
/// that platform.
pub fn project(record: &BrowserRecord, platform: Platform, rank: Option<usize>) -> Option<BrowserView> {
    let entry = record.on(platform)?;
    let latest = entry.latest()?;
    Some(build_view(record, entry, latest, rank))
}

impl RankedBrowser<'_> {
    /// Project this row, carrying its rank
    pub fn view(&self) -> BrowserView {
        build_view(self.record, self.entry, self.latest, Some(self.rank))
    }
}

fn build_view(
    record: &BrowserRecord,
    entry: &PlatformEntry,
    latest: &VersionScore,
    rank: Option<usize>,
) -> BrowserView {
    let latest_score = latest.scores.speedometer3;
    let previous_score = entry.previous().and_then(|v| v.scores.speedometer3);
    let delta = latest_score.zip(previous_score).map(|(l, p)| l - p);
    let trend_percent = latest_score
        .zip(previous_score)
        .filter(|(_, p)| *p != 0.0)
        .map(|(l, p)| (l - p) * 100.0 / p);

    BrowserView {
        name: record.name.clone(),
        rank,
        engine: entry.engine.clone(),
        engine_kind: entry.engine_kind(),
        logo: record.logo.clone(),
        website: record.website.clone(),
        latest_version: latest.version.clone(),
        latest_score,
        previous_score,
        delta,
        trend_percent,
        ram: latest.scores.ram,
        adblock: latest.scores.adblock,
        version_history: entry.versions.iter().rev().map(VersionPoint::from).collect(),
    }
}

/// Project every row of a ranking, in rank order
pub fn project_ranking(ranking: &Ranking<'_>) -> Vec<BrowserView> {
    ranking
        .entries
        .iter()
        .map(|row| row.view())
        .collect()
}

/// Score band relative to the best score in view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PerformanceTier {
    pub fn of(score: f64, max_score: f64) -> Self {
        if score >= max_score * 0.9 {
            PerformanceTier::Excellent
        } else if score >= max_score * 0.7 {
            PerformanceTier::Good
        } else if score >= max_score * 0.5 {
            PerformanceTier::Fair
        } else {
            PerformanceTier::Poor
        }
    }
}

/// One bar of a ranking bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub name: String,
    pub engine: String,
    pub score: f64,
    /// Bar length as a fraction of the chart's scale
    pub share_of_max: f64,
    pub tier: PerformanceTier,
}

/// Bar chart rows for a ranking
///
/// The scale is the best score in view, but never below 1.0.
pub fn chart(ranking: &Ranking<'_>) -> Vec<ChartBar> {
    let max_score = ranking
        .entries
        .iter()
        .map(|r| r.latest_score)
        .fold(1.0_f64, f64::max);

    ranking
        .entries
        .iter()
        .map(|row| ChartBar {
            name: row.name().to_string(),
            engine: row.engine().to_string(),
            score: row.latest_score,
            share_of_max: row.latest_score / max_score,
            tier: PerformanceTier::of(row.latest_score, max_score),
        })
        .collect()
}

/// Side-by-side comparison of selected browsers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub platform: Platform,
    /// First selected browser found; differences are relative to it
    pub baseline: Option<String>,
    pub entries: Vec<ComparisonEntry>,
    /// Requested names with no rankable data on the platform
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    pub name: String,
    pub engine: String,
    pub score: f64,
    pub diff_from_baseline: f64,
    pub percent_of_baseline: Option<f64>,
    pub ram: Option<f64>,
    pub adblock: Option<f64>,
}

/// Compare the named browsers on a platform, in the order requested
pub fn compare(records: &[BrowserRecord], platform: Platform, names: &[String]) -> Comparison {
    let mut entries: Vec<ComparisonEntry> = Vec::new();
    let mut missing = Vec::new();
    let mut baseline: Option<f64> = None;

    for name in names {
        let found = records
            .iter()
            .find(|r| &r.name == name)
            .and_then(|r| project(r, platform, None))
            .and_then(|view| view.latest_score.map(|score| (view, score)));

        let Some((view, score)) = found else {
            missing.push(name.clone());
            continue;
        };
        if entries.iter().any(|e| &e.name == name) {
            continue;
        }

        let base = *baseline.get_or_insert(score);
        entries.push(ComparisonEntry {
            name: view.name,
            engine: view.engine,
            score,
            diff_from_baseline: score - base,
            percent_of_baseline: (base != 0.0).then(|| score * 100.0 / base),
            ram: view.ram,
            adblock: view.adblock,
        });
    }

    Comparison {
        platform,
        baseline: entries.first().map(|e| e.name.clone()),
        entries,
        missing,
    }
}
