// src/monitor/evaluator.rs

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::ChangeCache;
use crate::errors::{Result, WatchcopyError};
use crate::provider::MetadataProvider;
use crate::stats::{self, StatsCounter};
use crate::types::{EntryId, Metadata};

use super::dispatch::{spawn_consumer, ConsumerContext, DEFAULT_QUEUE_CAPACITY};

enum MonitorState {
    Created,
    Started {
        tx: mpsc::Sender<Metadata>,
        consumer: JoinHandle<()>,
    },
    ShutDown,
}

impl fmt::Debug for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Created => f.write_str("Created"),
            MonitorState::Started { .. } => f.write_str("Started"),
            MonitorState::ShutDown => f.write_str("ShutDown"),
        }
    }
}

/// Watchlist evaluator.
///
/// Lifecycle: `new` -> [`start`](Monitor::start) -> any number of
/// [`evaluate_watchlist`](Monitor::evaluate_watchlist) cycles ->
/// [`shut_down`](Monitor::shut_down).
///
/// Each cycle walks the tree reachable from the explicit watchlist
/// breadth-first and streams every file it finds into a bounded dispatch
/// queue. A single consumer task drains that queue, compares each file with
/// the change cache and copies the ones that changed.
#[derive(Debug)]
pub struct Monitor {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn ChangeCache>,
    stats: Option<Arc<StatsCounter>>,
    /// Explicit watchlist in configuration order, without duplicates.
    watchlist: Vec<EntryId>,
    explicit: HashSet<EntryId>,
    queue_capacity: usize,
    state: MonitorState,
}

impl Monitor {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        watchlist: impl IntoIterator<Item = EntryId>,
        cache: Arc<dyn ChangeCache>,
    ) -> Self {
        let mut explicit = HashSet::new();
        let watchlist: Vec<EntryId> = watchlist
            .into_iter()
            .filter(|id| explicit.insert(id.clone()))
            .collect();

        Self {
            provider,
            cache,
            stats: None,
            watchlist,
            explicit,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            state: MonitorState::Created,
        }
    }

    /// Collect counters into `stats` from both the traversal and the consumer.
    pub fn with_stats(mut self, stats: Arc<StatsCounter>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Bound on outstanding dispatch items; clamped to at least 1.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn watchlist(&self) -> &[EntryId] {
        &self.watchlist
    }

    /// True if `id` was explicitly configured (as opposed to discovered).
    pub fn is_explicit(&self, id: &EntryId) -> bool {
        self.explicit.contains(id)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, MonitorState::Started { .. })
    }

    fn count(&self, name: &str) {
        if let Some(stats) = &self.stats {
            stats.increment(name);
        }
    }

    /// Allocate the dispatch queue and spawn the consumer task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            MonitorState::Created => {}
            MonitorState::Started { .. } => return Err(WatchcopyError::AlreadyStarted),
            MonitorState::ShutDown => return Err(WatchcopyError::Terminated),
        }

        let ctx = ConsumerContext {
            provider: Arc::clone(&self.provider),
            cache: Arc::clone(&self.cache),
            stats: self.stats.clone(),
        };
        let (tx, consumer) = spawn_consumer(ctx, self.queue_capacity);
        self.state = MonitorState::Started { tx, consumer };

        info!(
            watchlist = self.watchlist.len(),
            capacity = self.queue_capacity,
            "monitor started"
        );
        Ok(())
    }

    /// Run one breadth-first evaluation cycle over the watchlist.
    ///
    /// Provider errors only drop the offending id. Returns once the traversal
    /// is done; dispatched items keep draining in the background. Suspends
    /// while the dispatch queue is full.
    pub async fn evaluate_watchlist(&self) -> Result<()> {
        let tx = match &self.state {
            MonitorState::Started { tx, .. } => tx,
            _ => return Err(WatchcopyError::NotStarted),
        };

        let mut pending: VecDeque<EntryId> = self.watchlist.iter().cloned().collect();
        let mut dispatched = 0usize;

        while let Some(id) = pending.pop_front() {
            let lookup = id.clone();
            let metadata = match self
                .with_provider(move |p| p.retrieve_metadata(&lookup))
                .await
            {
                Ok(m) => m,
                Err(err) => {
                    warn!(entry = %id, error = %err, "failed to retrieve metadata; skipping");
                    self.count(stats::METADATA_ERRORS);
                    continue;
                }
            };

            if !metadata.is_directory {
                dispatch(tx, metadata).await?;
                dispatched += 1;
                continue;
            }

            let lookup = id.clone();
            let children = match self.with_provider(move |p| p.get_children(&lookup)).await {
                Ok(c) => c,
                Err(err) => {
                    warn!(entry = %id, error = %err, "failed to retrieve children; skipping");
                    self.count(stats::CHILDREN_ERRORS);
                    continue;
                }
            };
            self.count(stats::DIRECTORIES_EXPANDED);

            for child in children {
                if child.is_directory {
                    // Explicit directories are already seeded at the top level.
                    if !self.explicit.contains(&child.id) {
                        pending.push_back(child.id);
                    }
                } else {
                    dispatch(tx, child).await?;
                    dispatched += 1;
                }
            }
        }

        debug!(dispatched, "watchlist evaluation finished");
        Ok(())
    }

    /// Run a provider call on the blocking pool.
    async fn with_provider<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&dyn MetadataProvider) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let provider = Arc::clone(&self.provider);
        tokio::task::spawn_blocking(move || call(provider.as_ref()))
            .await
            .map_err(|err| anyhow!("provider task failed: {err}"))?
    }

    /// Close the dispatch queue and wait for the consumer to drain it.
    pub async fn shut_down(&mut self) -> Result<()> {
        let (tx, consumer) = match std::mem::replace(&mut self.state, MonitorState::ShutDown) {
            MonitorState::Started { tx, consumer } => (tx, consumer),
            other => {
                self.state = other;
                return Err(WatchcopyError::NotStarted);
            }
        };

        drop(tx);
        consumer
            .await
            .map_err(|err| anyhow!("dispatch consumer failed: {err}"))?;

        info!("monitor shut down");
        Ok(())
    }
}

async fn dispatch(tx: &mpsc::Sender<Metadata>, metadata: Metadata) -> Result<()> {
    debug!(entry = %metadata.id, last_modified = metadata.last_modified, "dispatching file");
    tx.send(metadata)
        .await
        .map_err(|_| WatchcopyError::QueueClosed)
}
