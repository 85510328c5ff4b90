use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfpost_core::CatalogIdentifier;

/// One successfully published item. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedEntry {
    #[serde(rename = "ean", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<CatalogIdentifier>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(rename = "norli_url", default)]
    pub source_url: String,
    #[serde(rename = "bluesky_post", default)]
    pub published_reference: String,
    #[serde(rename = "reviewed_at", default)]
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    #[serde(rename = "total_reviews", default)]
    pub total_generated: u64,
    #[serde(rename = "total_posted", default)]
    pub total_published: u64,
}

/// Everything carried between runs.
///
/// Files written before entries were tracked carry only a `reviewed_urls`
/// list. That key is ignored on read and never written back, so such files
/// load as an empty history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    #[serde(rename = "reviewed_books", default)]
    pub processed_entries: Vec<ProcessedEntry>,
    #[serde(default)]
    pub stats: RunStats,
}

impl PipelineState {
    /// Identifiers already published. Entries without one are skipped.
    #[must_use]
    pub fn identifiers(&self) -> HashSet<CatalogIdentifier> {
        self.processed_entries
            .iter()
            .filter_map(|entry| entry.identifier.as_ref())
            .filter(|id| !id.is_empty())
            .cloned()
            .collect()
    }

    /// Returns a new state with `entry` appended and both counters bumped.
    #[must_use]
    pub fn record(&self, entry: ProcessedEntry) -> PipelineState {
        let mut processed_entries = Vec::with_capacity(self.processed_entries.len() + 1);
        processed_entries.extend(self.processed_entries.iter().cloned());
        processed_entries.push(entry);
        PipelineState {
            processed_entries,
            stats: RunStats {
                total_generated: self.stats.total_generated.saturating_add(1),
                total_published: self.stats.total_published.saturating_add(1),
            },
        }
    }

    /// The `n` most recently processed entries, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ProcessedEntry> {
        self.processed_entries.iter().rev().take(n)
    }
}
