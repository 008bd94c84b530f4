//! Best-score tracking per quiz.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grading::percentage;
use crate::storage::{self, KeyValueStore, HIGH_SCORES_KEY};

/// The best result recorded for one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub percentage: u32,
    pub score: usize,
    pub total: usize,
    pub date: DateTime<Utc>,
}

/// Best records keyed by quiz key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScoreTable {
    records: BTreeMap<String, HighScoreRecord>,
}

impl HighScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `score / total` if it matches or beats the current best.
    ///
    /// An equal percentage still replaces the record, refreshing its date.
    /// An empty key or a zero total is ignored. Returns whether the table
    /// changed.
    pub fn record_if_better(
        &mut self,
        quiz_key: &str,
        score: usize,
        total: usize,
        now: DateTime<Utc>,
    ) -> bool {
        if quiz_key.is_empty() || total == 0 {
            return false;
        }

        let pct = percentage(score, total);
        let best = self.records.get(quiz_key).map_or(0, |r| r.percentage);
        if pct < best {
            return false;
        }

        self.records.insert(
            quiz_key.to_string(),
            HighScoreRecord {
                percentage: pct,
                score,
                total,
                date: now,
            },
        );
        true
    }

    pub fn best(&self, quiz_key: &str) -> Option<&HighScoreRecord> {
        self.records.get(quiz_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HighScoreRecord)> {
        self.records.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A [`HighScoreTable`] persisted through a key-value store.
pub struct HighScoreBook<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> HighScoreBook<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Current table; empty when nothing (readable) is stored.
    pub fn load(&self) -> HighScoreTable {
        storage::load_json(self.store, HIGH_SCORES_KEY).unwrap_or_default()
    }

    /// Record a result and persist the table when it changed.
    ///
    /// Returns whether the result became the stored best. Persistence
    /// failures are logged, not returned.
    pub fn record(&self, quiz_key: &str, score: usize, total: usize, now: DateTime<Utc>) -> bool {
        let mut table = self.load();
        if !table.record_if_better(quiz_key, score, total, now) {
            return false;
        }
        if storage::save_json(self.store, HIGH_SCORES_KEY, &table) {
            tracing::info!(
                "new high score for {quiz_key}: {}%",
                percentage(score, total)
            );
        }
        true
    }
}
