//! Response cache for the match engine.
//!
//! Not an LRU: every hit bumps a global counter and once the counter reaches
//! the threshold the whole cache is dropped at once.

use std::collections::HashMap;
use tracing::debug;

use super::language::Language;
use super::matcher::MatchResult;

/// Hits after which the cache is cleared
pub const DEFAULT_CLEAR_THRESHOLD: usize = 500;

/// Normalized query text plus its detected language
pub type CacheKey = (String, Language);

/// Memoized lookups. A stored `None` records "no match".
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, Option<MatchResult>>,
    hit_count: usize,
    clear_threshold: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_THRESHOLD)
    }
}

impl ResponseCache {
    pub fn new(clear_threshold: usize) -> Self {
        Self {
            entries: HashMap::new(),
            hit_count: 0,
            clear_threshold: clear_threshold.max(1),
        }
    }

    /// Look up a key. On a hit the stored value is returned even when this
    /// hit is the one that triggers the clear.
    pub fn get(&mut self, key: &CacheKey) -> Option<Option<MatchResult>> {
        let value = self.entries.get(key).cloned()?;

        self.hit_count += 1;
        if self.hit_count >= self.clear_threshold {
            debug!(
                "Response cache reached {} hits, clearing {} entries",
                self.hit_count,
                self.entries.len()
            );
            self.clear();
        }

        Some(value)
    }

    pub fn insert(&mut self, key: CacheKey, value: Option<MatchResult>) {
        self.entries.insert(key, value);
    }

    /// Drop all entries and reset the hit counter
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hit_count = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_count(&self) -> usize {
        self.hit_count
    }
}
