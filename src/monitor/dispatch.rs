// src/monitor/dispatch.rs

//! Bounded hand-off between the traversal and the single consumer task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::ChangeCache;
use crate::provider::MetadataProvider;
use crate::stats::{self, StatsCounter};
use crate::types::Metadata;

/// Default bound on outstanding dispatch items.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Everything the consumer needs to evaluate one dispatched item.
#[derive(Debug, Clone)]
pub(crate) struct ConsumerContext {
    pub provider: Arc<dyn MetadataProvider>,
    pub cache: Arc<dyn ChangeCache>,
    pub stats: Option<Arc<StatsCounter>>,
}

impl ConsumerContext {
    fn count(&self, name: &str) {
        if let Some(stats) = &self.stats {
            stats.increment(name);
        }
    }

    /// Copy the file iff its timestamp is newer than the cached one.
    ///
    /// Returns the version that was copied, if any.
    pub fn evaluate_metadata(&self, metadata: &Metadata) -> Option<u64> {
        self.count(stats::EVALUATED);

        let Some(version) = self
            .cache
            .record_if_newer(&metadata.id, metadata.last_modified)
        else {
            debug!(entry = %metadata.id, "unchanged since last evaluation");
            self.count(stats::UNCHANGED);
            return None;
        };

        match self.provider.copy_file(&metadata.id, version) {
            Ok(()) => {
                debug!(entry = %metadata.id, version, "copied changed file");
                self.count(stats::COPIED);
            }
            Err(err) => {
                warn!(entry = %metadata.id, version, error = %err, "copy failed");
                self.count(stats::COPY_FAILED);
            }
        }
        Some(version)
    }
}

/// Spawn the consumer task.
///
/// The returned sender is the producer side of the dispatch queue. Items are
/// evaluated strictly in the order they were sent; the task drains whatever
/// is left and exits once every sender has been dropped.
pub(crate) fn spawn_consumer(
    ctx: ConsumerContext,
    capacity: usize,
) -> (mpsc::Sender<Metadata>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Metadata>(capacity.max(1));

    let handle = tokio::spawn(async move {
        info!(capacity, "dispatch consumer started");

        while let Some(metadata) = rx.recv().await {
            // Provider and cache calls block; keep them off the async workers.
            // Awaiting each item before receiving the next preserves order.
            let item = ctx.clone();
            let id = metadata.id.clone();
            if let Err(err) =
                tokio::task::spawn_blocking(move || item.evaluate_metadata(&metadata)).await
            {
                warn!(entry = %id, error = %err, "evaluation task failed");
                ctx.count(stats::COPY_FAILED);
            }
        }

        info!("dispatch consumer finished (queue closed)");
    });

    (tx, handle)
}
