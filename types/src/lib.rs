use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ── Per-window counts ────────────────────────────────────────────────────

/// Token → number of messages in one window whose token set contains it.
pub type TokenCounts = BTreeMap<String, u32>;

/// One materialized time window of the chat timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Inclusive end boundary of the window (UTC+9).
    pub window_end: DateTime<FixedOffset>,
    pub counts: TokenCounts,
}

impl TimelineEntry {
    /// Count for `token` in this window, 0 if it never appeared.
    pub fn count(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }
}

// ── Whole timeline ───────────────────────────────────────────────────────

/// Ordered sequence of windows, as produced by aggregation and stored in the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all per-window counts, ordered by count descending.
    ///
    /// Ties keep first-seen order: windows in sequence, tokens within a
    /// window in key order.
    pub fn word_counts(&self) -> Vec<WordCount> {
        let mut totals: Vec<WordCount> = Vec::new();
        let mut index: BTreeMap<&str, usize> = BTreeMap::new();

        for entry in &self.entries {
            for (token, count) in &entry.counts {
                match index.get(token.as_str()) {
                    Some(&i) => totals[i].total_count += u64::from(*count),
                    None => {
                        index.insert(token.as_str(), totals.len());
                        totals.push(WordCount {
                            token: token.clone(),
                            total_count: u64::from(*count),
                        });
                    }
                }
            }
        }

        // sort_by is stable
        totals.sort_by(|a, b| b.total_count.cmp(&a.total_count));
        totals
    }
}

// ── Frequency report row ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub token: String,
    pub total_count: u64,
}
