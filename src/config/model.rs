// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::monitor::DEFAULT_QUEUE_CAPACITY;
use crate::types::EntryId;

/// Configuration exactly as read from a TOML file.
///
/// ```toml
/// [config]
/// watch_interval_ms = 100
/// queue_capacity = 100
///
/// [source]
/// datafile = "testdata/small.json"
/// ```
///
/// or, to watch a local directory:
///
/// ```toml
/// [source]
/// root = "/srv/data"
/// watch = ["reports", "notes.txt"]
/// cycles = 10
/// ```
///
/// All sections are optional; validation into [`ConfigFile`] decides
/// whether the combination makes sense.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub source: SourceSection,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Pause between evaluation cycles, in milliseconds.
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,

    /// Bound on outstanding items in the dispatch queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_watch_interval_ms() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            watch_interval_ms: default_watch_interval_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl ConfigSection {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

/// `[source]` section. Exactly one of `datafile` / `root` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceSection {
    /// JSON fixture backing an in-memory tree.
    #[serde(default)]
    pub datafile: Option<PathBuf>,

    /// Local directory to watch.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Watchlist relative to `root` (`""` is the root itself).
    #[serde(default)]
    pub watch: Vec<String>,

    /// Number of evaluation cycles to run against `root`.
    #[serde(default)]
    pub cycles: Option<usize>,
}

impl SourceSection {
    /// A source pointing at a fixture file, dropping any directory settings.
    pub fn fixture(datafile: impl Into<PathBuf>) -> Self {
        Self {
            datafile: Some(datafile.into()),
            ..Self::default()
        }
    }
}

/// Where entries come from, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// In-memory tree, watchlist and update steps loaded from a JSON fixture.
    Fixture { datafile: PathBuf },
    /// Local directory, evaluated `cycles` times.
    Directory {
        root: PathBuf,
        watch: Vec<EntryId>,
        cycles: usize,
    },
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub source: Source,
}
