//! Caller-owned memoization of acquired tables.
//!
//! The library never fetches data. Callers that do can keep a [`SheetCache`] next to their
//! loader, keyed by whatever identifies a request, and clear entries explicitly when the
//! user asks for fresh data.

use crate::error::Result;
use crate::table::Table;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifies one sheet of one spreadsheet source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetRequest {
    pub source: String,
    pub sheet: Option<String>,
}

impl SheetRequest {
    pub fn new(source: impl Into<String>, sheet: Option<String>) -> Self {
        Self {
            source: source.into(),
            sheet,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

#[derive(Debug)]
pub struct SheetCache<K = SheetRequest> {
    entries: HashMap<K, Table>,
    stats: CacheStats,
}

impl<K> Default for SheetCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<K> SheetCache<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&Table> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, table: Table) {
        self.entries.insert(key, table);
    }

    /// Returns the cached table for `key`, running `load` only on a miss.
    /// A failed load caches nothing.
    pub fn get_or_try_load<F>(&mut self, key: &K, load: F) -> Result<&Table>
    where
        F: FnOnce(&K) -> Result<Table>,
    {
        if self.entries.contains_key(key) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            debug!("Cache miss for {:?}; loading", key);
            let table = load(key)?;
            self.entries.insert(key.clone(), table);
        }

        // Present in both branches above.
        Ok(&self.entries[key])
    }

    /// Drops one entry. Returns whether anything was cached for `key`.
    pub fn invalidate(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.invalidations += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.stats.invalidations += self.entries.len() as u64;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
