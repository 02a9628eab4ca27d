// src/provider/mock.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use super::MetadataProvider;
use crate::errors::{Result, WatchcopyError};
use crate::types::{EntryId, Metadata};

#[derive(Debug, Clone)]
struct MockEntry {
    last_modified: i64,
    is_directory: bool,
}

#[derive(Debug, Default)]
struct MockTree {
    /// Insertion order, used for random picks and stable listings.
    order: Vec<EntryId>,
    entries: HashMap<EntryId, MockEntry>,
    /// Directory id -> child ids. The root is always present.
    children: HashMap<EntryId, Vec<EntryId>>,
    copies: Vec<(EntryId, u64)>,
    last_stamp: i64,
}

impl MockTree {
    /// Current wall-clock millis, strictly after every stamp handed out so far.
    fn next_stamp(&mut self) -> i64 {
        // Pre-epoch clocks read as 0; far-future ones saturate.
        let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => super::millis(elapsed).unwrap_or(i64::MAX),
            Err(_) => 0,
        };
        self.last_stamp = now.max(self.last_stamp.saturating_add(1));
        self.last_stamp
    }

    fn insert(&mut self, id: EntryId, parent: EntryId, is_directory: bool) {
        let last_modified = self.next_stamp();
        if is_directory {
            self.children.entry(id.clone()).or_default();
        }
        self.children.entry(parent).or_default().push(id.clone());
        self.order.push(id.clone());
        self.entries.insert(
            id,
            MockEntry {
                last_modified,
                is_directory,
            },
        );
    }

    fn metadata(&self, id: &EntryId) -> Option<Metadata> {
        self.entries.get(id).map(|e| Metadata {
            id: id.clone(),
            last_modified: e.last_modified,
            is_directory: e.is_directory,
        })
    }
}

/// In-memory backend with a synthetic directory tree.
///
/// Cloning shares the underlying tree, so a test can keep a handle for
/// mutating timestamps and inspecting copies while the monitor owns another.
#[derive(Debug, Clone)]
pub struct MockProvider {
    tree: Arc<Mutex<MockTree>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        let mut tree = MockTree::default();
        // Ensure root exists
        tree.children.insert(EntryId::root(), Vec::new());

        Self {
            tree: Arc::new(Mutex::new(tree)),
        }
    }

    /// Build a random tree of `directory_count` directories and `file_count`
    /// files. Ids are `directory<N>` and `file<N>`, both 1-based.
    pub fn generate(file_count: usize, directory_count: usize) -> Self {
        Self::generate_with_rng(file_count, directory_count, &mut rand::thread_rng())
    }

    /// Same as [`MockProvider::generate`] with a caller-supplied RNG.
    ///
    /// The first two directories and the first tenth of the files stay at the
    /// root; every other directory hangs off an earlier directory, every
    /// other file off a random directory.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        file_count: usize,
        directory_count: usize,
        rng: &mut R,
    ) -> Self {
        let provider = Self::new();
        let directory_id = |i: usize| EntryId::new(format!("directory{}", i + 1));

        for i in 0..directory_count {
            let parent = if i < 2 {
                EntryId::root()
            } else {
                directory_id(rng.gen_range(0..i))
            };
            provider.add_directory(directory_id(i), parent);
        }

        for i in 0..file_count {
            let parent = if directory_count == 0 || i < file_count / 10 {
                EntryId::root()
            } else {
                directory_id(rng.gen_range(0..directory_count))
            };
            provider.add_file(EntryId::new(format!("file{}", i + 1)), parent);
        }

        info!(file_count, directory_count, "generated mock tree");
        provider
    }

    fn tree(&self) -> MutexGuard<'_, MockTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a file under `parent` (use [`EntryId::root`] for the root).
    pub fn add_file(&self, id: impl Into<EntryId>, parent: impl Into<EntryId>) {
        self.tree().insert(id.into(), parent.into(), false);
    }

    /// Add an empty directory under `parent`.
    pub fn add_directory(&self, id: impl Into<EntryId>, parent: impl Into<EntryId>) {
        self.tree().insert(id.into(), parent.into(), true);
    }

    /// Stamp the entry with the current time. Unknown ids are ignored.
    pub fn update_last_modified(&self, id: &EntryId) {
        let mut tree = self.tree();
        if tree.entries.contains_key(id) {
            let stamp = tree.next_stamp();
            if let Some(entry) = tree.entries.get_mut(id) {
                entry.last_modified = stamp;
            }
        }
    }

    /// Force an explicit timestamp, e.g. to simulate clock skew in tests.
    pub fn set_last_modified(&self, id: &EntryId, last_modified: i64) {
        if let Some(entry) = self.tree().entries.get_mut(id) {
            entry.last_modified = last_modified;
        }
    }

    /// Touch a random entry and return its id.
    pub fn update_any(&self) -> Option<EntryId> {
        let id = self.tree().order.choose(&mut rand::thread_rng()).cloned()?;
        self.update_last_modified(&id);
        Some(id)
    }

    /// Pick `count` distinct random entries (files or directories).
    pub fn create_watch_list(&self, count: usize) -> Vec<EntryId> {
        let tree = self.tree();
        tree.order
            .choose_multiple(&mut rand::thread_rng(), count)
            .cloned()
            .collect()
    }

    /// Every id in insertion order.
    pub fn entry_ids(&self) -> Vec<EntryId> {
        self.tree().order.clone()
    }

    pub fn len(&self) -> usize {
        self.tree().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree().order.is_empty()
    }

    /// Every successful `copy_file` call, in call order.
    pub fn copies(&self) -> Vec<(EntryId, u64)> {
        self.tree().copies.clone()
    }

    /// Number of successful copies recorded for `id`.
    pub fn copy_count(&self, id: &EntryId) -> usize {
        self.tree().copies.iter().filter(|(c, _)| c == id).count()
    }
}

impl MetadataProvider for MockProvider {
    fn retrieve_metadata(&self, id: &EntryId) -> Result<Metadata> {
        if id.is_root() {
            return Ok(Metadata::directory(EntryId::root(), 0));
        }
        self.tree()
            .metadata(id)
            .ok_or_else(|| WatchcopyError::NotFound(id.clone()))
    }

    fn get_children(&self, id: &EntryId) -> Result<Vec<Metadata>> {
        let tree = self.tree();
        match tree.children.get(id) {
            Some(child_ids) => child_ids
                .iter()
                .map(|child| {
                    tree.metadata(child)
                        .ok_or_else(|| WatchcopyError::NotFound(child.clone()))
                })
                .collect(),
            None if tree.entries.contains_key(id) => {
                Err(WatchcopyError::NotADirectory(id.clone()))
            }
            None => Err(WatchcopyError::NotFound(id.clone())),
        }
    }

    fn copy_file(&self, id: &EntryId, version: u64) -> Result<()> {
        let mut tree = self.tree();
        match tree.entries.get(id) {
            None => Err(WatchcopyError::NotFound(id.clone())),
            Some(entry) if entry.is_directory => Err(WatchcopyError::IsADirectory(id.clone())),
            Some(_) => {
                info!(entry = %id, version, "copying file");
                tree.copies.push((id.clone(), version));
                Ok(())
            }
        }
    }
}
