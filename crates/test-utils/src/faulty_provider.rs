use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use watchcopy::errors::{Result, WatchcopyError};
use watchcopy::provider::MetadataProvider;
use watchcopy::provider::mock::MockProvider;
use watchcopy::types::{EntryId, Metadata};

/// A provider that:
/// - forwards to a `MockProvider`
/// - fails on selected ids with a chosen operation
/// - counts traversal calls so tests can assert nothing was walked.
#[derive(Debug)]
pub struct FaultyProvider {
    inner: MockProvider,
    missing_metadata: HashSet<EntryId>,
    broken_children: HashSet<EntryId>,
    metadata_calls: Arc<AtomicUsize>,
    children_calls: Arc<AtomicUsize>,
    copy_attempts: Arc<Mutex<Vec<(EntryId, u64)>>>,
}

impl FaultyProvider {
    pub fn new(inner: MockProvider) -> Self {
        Self {
            inner,
            missing_metadata: HashSet::new(),
            broken_children: HashSet::new(),
            metadata_calls: Arc::new(AtomicUsize::new(0)),
            children_calls: Arc::new(AtomicUsize::new(0)),
            copy_attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `retrieve_metadata(id)` reports `NotFound` even if the entry exists.
    pub fn hide(mut self, id: &str) -> Self {
        self.missing_metadata.insert(EntryId::from(id));
        self
    }

    /// `get_children(id)` fails with an IO error.
    pub fn break_children(mut self, id: &str) -> Self {
        self.broken_children.insert(EntryId::from(id));
        self
    }

    pub fn metadata_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.metadata_calls)
    }

    pub fn children_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.children_calls)
    }

    /// Every `copy_file` call, including ones the inner provider rejected.
    pub fn copy_attempts(&self) -> Arc<Mutex<Vec<(EntryId, u64)>>> {
        Arc::clone(&self.copy_attempts)
    }
}

impl MetadataProvider for FaultyProvider {
    fn retrieve_metadata(&self, id: &EntryId) -> Result<Metadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.missing_metadata.contains(id) {
            return Err(WatchcopyError::NotFound(id.clone()));
        }
        self.inner.retrieve_metadata(id)
    }

    fn get_children(&self, id: &EntryId) -> Result<Vec<Metadata>> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_children.contains(id) {
            return Err(WatchcopyError::IoError(std::io::Error::other(format!(
                "backend unavailable while listing {id}"
            ))));
        }
        self.inner.get_children(id)
    }

    fn copy_file(&self, id: &EntryId, version: u64) -> Result<()> {
        {
            let mut guard = self.copy_attempts.lock().unwrap();
            guard.push((id.clone(), version));
        }
        self.inner.copy_file(id, version)
    }
}
