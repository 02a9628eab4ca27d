// src/cache.rs

//! Versioned change cache.
//!
//! Maps an entry id to the last modification timestamp recorded for it and a
//! version counter that advances by one per detected change.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::types::{CacheEntry, EntryId};

/// Capability interface for the change cache.
///
/// The cache is shared between the monitor's consumer task and reporting
/// code, so every method takes `&self`.
pub trait ChangeCache: Send + Sync + Debug {
    /// Last recorded `(last_modified, version)` for `id`.
    ///
    /// Unseen ids are lazily initialised to `(0, 0)`.
    fn get(&self, id: &EntryId) -> (i64, u64);

    /// Record `last_modified` and bump the version, returning the new one.
    ///
    /// Bumps unconditionally; callers gate this on a detected change.
    fn update(&self, id: &EntryId, last_modified: i64) -> u64;

    /// Every id ever observed, in no particular order.
    fn all_keys(&self) -> Vec<EntryId>;

    /// Record a new version iff `last_modified` is strictly newer than the
    /// stored timestamp. Returns the new version when one was recorded.
    ///
    /// The default is only atomic when a single task drives the cache.
    /// Implementations shared by several writers should override it.
    fn record_if_newer(&self, id: &EntryId, last_modified: i64) -> Option<u64> {
        let (recorded, _) = self.get(id);
        (recorded < last_modified).then(|| self.update(id, last_modified))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CacheItem {
    last_modified: i64,
    version: u64,
}

/// In-memory history of every entry the monitor has looked at.
///
/// Grows monotonically; entries are never evicted.
#[derive(Debug, Default)]
pub struct HistoryCache {
    history: Mutex<HashMap<EntryId, CacheItem>>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(HashMap::new()),
        }
    }

    fn history(&self) -> MutexGuard<'_, HashMap<EntryId, CacheItem>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of a single entry without lazily creating it.
    pub fn entry(&self, id: &EntryId) -> Option<CacheEntry> {
        self.history().get(id).map(|item| CacheEntry {
            id: id.clone(),
            last_modified: item.last_modified,
            version: item.version,
        })
    }

    pub fn len(&self) -> usize {
        self.history().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history().is_empty()
    }
}

fn bump(item: &mut CacheItem, last_modified: i64) -> u64 {
    item.last_modified = last_modified;
    item.version += 1;
    item.version
}

impl ChangeCache for HistoryCache {
    fn get(&self, id: &EntryId) -> (i64, u64) {
        let mut history = self.history();
        let item = history.entry(id.clone()).or_default();
        (item.last_modified, item.version)
    }

    fn update(&self, id: &EntryId, last_modified: i64) -> u64 {
        let mut history = self.history();
        let version = bump(history.entry(id.clone()).or_default(), last_modified);
        debug!(entry = %id, last_modified, version, "recorded new version");
        version
    }

    fn all_keys(&self) -> Vec<EntryId> {
        self.history().keys().cloned().collect()
    }

    fn record_if_newer(&self, id: &EntryId, last_modified: i64) -> Option<u64> {
        let mut history = self.history();
        let item = history.entry(id.clone()).or_default();
        if item.last_modified >= last_modified {
            return None;
        }
        let version = bump(item, last_modified);
        debug!(entry = %id, last_modified, version, "recorded new version");
        Some(version)
    }
}
