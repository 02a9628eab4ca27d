use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use watchcopy::errors::Result;
use watchcopy::provider::MetadataProvider;
use watchcopy::provider::mock::MockProvider;
use watchcopy::types::{EntryId, Metadata};

/// Longest a `copy_file` call waits for the gate before going ahead anyway,
/// so a failing test cannot leave a blocking thread parked forever.
const MAX_HOLD: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct Gate {
    open: Mutex<bool>,
    changed: Condvar,
}

/// A provider whose `copy_file` blocks until the gate is opened.
///
/// Metadata and listings go straight to the inner `MockProvider`, so the
/// traversal runs freely while the consumer is stuck on its first copy.
#[derive(Debug, Clone)]
pub struct GatedProvider {
    inner: MockProvider,
    gate: Arc<Gate>,
}

impl GatedProvider {
    /// Starts closed.
    pub fn new(inner: MockProvider) -> Self {
        Self {
            inner,
            gate: Arc::new(Gate::default()),
        }
    }

    pub fn open(&self) {
        let mut open = self.gate.open.lock().unwrap();
        *open = true;
        self.gate.changed.notify_all();
    }
}

impl MetadataProvider for GatedProvider {
    fn retrieve_metadata(&self, id: &EntryId) -> Result<Metadata> {
        self.inner.retrieve_metadata(id)
    }

    fn get_children(&self, id: &EntryId) -> Result<Vec<Metadata>> {
        self.inner.get_children(id)
    }

    fn copy_file(&self, id: &EntryId, version: u64) -> Result<()> {
        {
            let open = self.gate.open.lock().unwrap();
            let _ = self
                .gate
                .changed
                .wait_timeout_while(open, MAX_HOLD, |open| !*open)
                .unwrap();
        }
        self.inner.copy_file(id, version)
    }
}
