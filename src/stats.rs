// src/stats.rs

//! Named counters collected while the monitor runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

pub const EVALUATED: &str = "evaluated";
pub const COPIED: &str = "copied";
pub const UNCHANGED: &str = "unchanged";
pub const COPY_FAILED: &str = "copy_failed";
pub const METADATA_ERRORS: &str = "metadata_errors";
pub const CHILDREN_ERRORS: &str = "children_errors";
pub const DIRECTORIES_EXPANDED: &str = "directories_expanded";

/// Thread-safe accumulator of named counters.
///
/// Shared by the traversal (caller side) and the consumer task.
#[derive(Debug, Default)]
pub struct StatsCounter {
    stats: Mutex<BTreeMap<String, u64>>,
}

impl StatsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn stats(&self) -> MutexGuard<'_, BTreeMap<String, u64>> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn increment(&self, name: &str) {
        *self.stats().entry(name.to_string()).or_insert(0) += 1;
    }

    /// Current value; counters never incremented read as 0.
    pub fn get(&self, name: &str) -> u64 {
        self.stats().get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.stats().clone()
    }

    pub fn dump_to_log(&self) {
        for (name, value) in self.snapshot() {
            info!(stat = %name, value, "monitor stat");
        }
    }
}
