// Single-use cache store.
// Entries are removed by the read that returns them; nothing expires on its own.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::entity::WarmupResult;

/// Stored warm-up result with metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The warmed result.
    pub value: WarmupResult,
    /// When the entry was stored.
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(value: WarmupResult) -> Self {
        Self {
            value,
            stored_at: Utc::now(),
        }
    }

    /// Check if the entry has been waiting longer than `max_age`.
    pub fn is_older_than(&self, max_age: Duration) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        elapsed > max_age
    }
}

/// Key to result mapping where each written value is handed out at most once.
///
/// Cloning shares the underlying storage, so one cache can be handed to both
/// the warm-up side and the consumer side.
#[derive(Debug, Clone, Default)]
pub struct SingleUseCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl SingleUseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, silently replacing any unclaimed entry under the same key.
    pub fn put(&self, key: impl Into<String>, value: WarmupResult) {
        self.entries.insert(key.into(), CacheEntry::new(value));
    }

    /// Remove and return the entry for `key`.
    ///
    /// Removal is atomic per key: among concurrent callers, only one gets the value.
    pub fn take_once(&self, key: &str) -> Option<WarmupResult> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Check for an unclaimed entry without consuming it.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of unclaimed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every unclaimed entry. Returns how many were dropped.
    pub fn purge(&self) -> usize {
        let before = self.entries.len();
        self.entries.clear();
        before
    }

    /// Drop unclaimed entries stored more than `max_age` ago. Returns how many were dropped.
    pub fn purge_older_than(&self, max_age: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_older_than(max_age));
        before.saturating_sub(self.entries.len())
    }
}
