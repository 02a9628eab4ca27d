#![allow(dead_code)]

use std::sync::Arc;

use watchcopy::cache::HistoryCache;
use watchcopy::monitor::Monitor;
use watchcopy::provider::MetadataProvider;
use watchcopy::provider::mock::MockProvider;
use watchcopy::stats::StatsCounter;
use watchcopy::types::EntryId;

/// Builder for a `MockProvider` tree to simplify test setup.
///
/// Parents must be added before their children; `""` is the root.
pub struct TreeBuilder {
    provider: MockProvider,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            provider: MockProvider::new(),
        }
    }

    pub fn dir(self, id: &str, parent: &str) -> Self {
        self.provider.add_directory(id, parent);
        self
    }

    pub fn file(self, id: &str, parent: &str) -> Self {
        self.provider.add_file(id, parent);
        self
    }

    pub fn build(self) -> MockProvider {
        self.provider
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The tree used by most monitor scenarios:
///
/// ```text
/// <root>
/// ├── dir1
/// │   ├── dir2
/// │   │   └── file3
/// │   ├── dir3
/// │   └── file2
/// └── file1
/// ```
pub fn scenario_tree() -> MockProvider {
    TreeBuilder::new()
        .dir("dir1", "")
        .dir("dir2", "dir1")
        .dir("dir3", "dir1")
        .file("file1", "")
        .file("file2", "dir1")
        .file("file3", "dir2")
        .build()
}

/// Builder for a `Monitor` with a fresh cache and stats.
pub struct MonitorBuilder {
    provider: Arc<dyn MetadataProvider>,
    watchlist: Vec<EntryId>,
    queue_capacity: Option<usize>,
}

/// Handles to everything a built monitor shares with the test.
pub struct MonitorParts {
    pub monitor: Monitor,
    pub cache: Arc<HistoryCache>,
    pub stats: Arc<StatsCounter>,
}

impl MonitorBuilder {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            watchlist: Vec::new(),
            queue_capacity: None,
        }
    }

    pub fn watch(mut self, id: &str) -> Self {
        self.watchlist.push(EntryId::from(id));
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> MonitorParts {
        let cache = Arc::new(HistoryCache::new());
        let stats = Arc::new(StatsCounter::new());
        let mut monitor = Monitor::new(self.provider, self.watchlist, cache.clone())
            .with_stats(stats.clone());
        if let Some(capacity) = self.queue_capacity {
            monitor = monitor.with_queue_capacity(capacity);
        }
        MonitorParts {
            monitor,
            cache,
            stats,
        }
    }
}
