//! Joins the canonical browser list with each platform document

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::loader::{PlatformDocEntry, RawDataset};
use crate::model::{BrowserRecord, PlatformEntry, PlatformTable};

/// Merged, immutable dataset with load metadata
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub records: Vec<BrowserRecord>,
    pub loaded_at: DateTime<Utc>,
    /// Malformed source elements dropped while loading
    pub skipped: usize,
}

impl Dataset {
    pub fn from_raw(raw: RawDataset) -> Self {
        let skipped = raw.skipped;
        Self {
            records: merge(raw),
            loaded_at: Utc::now(),
            skipped,
        }
    }

    pub fn find(&self, name: &str) -> Option<&BrowserRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

/// Build one record per canonical entry, in canonical order
///
/// Platform entries are matched by exact name. When a platform document
/// repeats a name, the first occurrence wins. Platform entries naming no
/// canonical browser are dropped.
pub fn merge(raw: RawDataset) -> Vec<BrowserRecord> {
    let mut records: Vec<BrowserRecord> = raw
        .browsers
        .into_iter()
        .map(|b| BrowserRecord {
            name: b.name,
            logo: b.logo,
            website: b.website,
            platforms: PlatformTable::default(),
        })
        .collect();

    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if index.contains_key(&record.name) {
            debug!("Duplicate canonical browser '{}' ignored for merging", record.name);
            continue;
        }
        index.insert(record.name.clone(), i);
    }

    for (platform, entries) in raw.platforms {
        let mut by_name: HashMap<String, PlatformDocEntry> = HashMap::with_capacity(entries.len());
        for entry in entries {
            if by_name.contains_key(&entry.name) {
                debug!("Duplicate '{}' in {} ignored", entry.name, platform.data_file());
                continue;
            }
            by_name.insert(entry.name.clone(), entry);
        }

        for (i, record) in records.iter_mut().enumerate() {
            // A duplicated canonical name only receives data on its first record
            if index.get(&record.name) != Some(&i) {
                continue;
            }
            if let Some(entry) = by_name.remove(&record.name) {
                record.platforms.set(
                    platform,
                    Some(PlatformEntry {
                        engine: entry.engine,
                        versions: entry.versions,
                    }),
                );
            }
        }

        for orphan in by_name.keys() {
            debug!(
                "'{}' in {} has no canonical entry, dropped",
                orphan,
                platform.data_file()
            );
        }
    }

    records
}
