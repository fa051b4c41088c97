//! Catalog statistics.
//!
//! # Invariants
//! - Empty input yields zero counts and no year range or volume.
//! - List-valued process fields count each distinct tag once.

use crate::model::article::ArticleRecord;
use crate::search::facets::decade_of;
use std::collections::{BTreeMap, BTreeSet};

/// Aggregates shown by the statistics view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_articles: usize,
    pub unique_processes: usize,
    /// `(oldest, newest)` publication year.
    pub year_range: Option<(i32, i32)>,
    pub latest_volume: Option<i32>,
    /// Article count keyed by decade start year.
    pub articles_by_decade: BTreeMap<i32, usize>,
}

impl CatalogStats {
    pub fn compute(records: &[ArticleRecord]) -> Self {
        let mut processes = BTreeSet::new();
        let mut articles_by_decade = BTreeMap::new();
        let mut year_range: Option<(i32, i32)> = None;
        let mut latest_volume: Option<i32> = None;

        for record in records {
            if let Some(process) = record.process.as_ref() {
                processes.extend(
                    process
                        .values()
                        .iter()
                        .map(|value| value.trim())
                        .filter(|value| !value.is_empty()),
                );
            }
            *articles_by_decade.entry(decade_of(record.year)).or_insert(0) += 1;
            year_range = Some(match year_range {
                Some((min, max)) => (min.min(record.year), max.max(record.year)),
                None => (record.year, record.year),
            });
            latest_volume = Some(latest_volume.map_or(record.volume, |v| v.max(record.volume)));
        }

        Self {
            total_articles: records.len(),
            unique_processes: processes.len(),
            year_range,
            latest_volume,
            articles_by_decade,
        }
    }

    /// Year range as `"min - max"`, or `N/A` for an empty catalog.
    pub fn year_range_display(&self) -> String {
        match self.year_range {
            Some((min, max)) => format!("{min} - {max}"),
            None => crate::model::article::PLACEHOLDER.to_string(),
        }
    }
}
