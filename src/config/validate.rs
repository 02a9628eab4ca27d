// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, Source};
use crate::errors::{Result, WatchcopyError};
use crate::types::EntryId;

/// Default number of cycles when watching a local directory.
pub const DEFAULT_CYCLES: usize = 1;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchcopyError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let source = match (raw.source.datafile, raw.source.root) {
            (Some(datafile), None) => Source::Fixture { datafile },
            (None, Some(root)) => Source::Directory {
                root,
                watch: raw
                    .source
                    .watch
                    .iter()
                    .map(|w| EntryId::new(normalize_watch_entry(w)))
                    .collect(),
                cycles: raw.source.cycles.unwrap_or(DEFAULT_CYCLES),
            },
            _ => {
                return Err(WatchcopyError::ConfigError(
                    "exactly one of source.datafile or source.root is required".to_string(),
                ));
            }
        };

        Ok(ConfigFile {
            config: raw.config,
            source,
        })
    }
}

/// Check the invariants `TryFrom<RawConfigFile>` relies on.
pub fn validate_raw_config(raw: &RawConfigFile) -> Result<()> {
    if raw.config.queue_capacity == 0 {
        return Err(WatchcopyError::ConfigError(
            "config.queue_capacity must be at least 1".to_string(),
        ));
    }

    let source = &raw.source;
    match (&source.datafile, &source.root) {
        (Some(_), Some(_)) => Err(WatchcopyError::ConfigError(
            "source.datafile and source.root are mutually exclusive".to_string(),
        )),
        (None, None) => Err(WatchcopyError::ConfigError(
            "one of source.datafile or source.root is required".to_string(),
        )),
        (Some(_), None) => {
            if !source.watch.is_empty() || source.cycles.is_some() {
                return Err(WatchcopyError::ConfigError(
                    "source.watch and source.cycles only apply to source.root; \
                     fixtures carry their own watchlist and updates"
                        .to_string(),
                ));
            }
            Ok(())
        }
        (None, Some(_)) => {
            if source.watch.is_empty() {
                return Err(WatchcopyError::ConfigError(
                    "source.watch must list at least one entry when source.root is set"
                        .to_string(),
                ));
            }
            if source.cycles == Some(0) {
                return Err(WatchcopyError::ConfigError(
                    "source.cycles must be at least 1".to_string(),
                ));
            }
            Ok(())
        }
    }
}

/// Turn a user-written relative path into a provider id: `/`-separated,
/// without leading `./`, trailing or duplicate slashes.
fn normalize_watch_entry(entry: &str) -> String {
    entry
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}
