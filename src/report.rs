// src/report.rs

//! End-of-run watch report built from the change cache.

use std::collections::HashSet;
use std::fmt;

use tracing::info;

use crate::cache::ChangeCache;
use crate::provider::MetadataProvider;
use crate::types::EntryId;

/// How an entry came to be watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchType {
    /// Listed in the configured watchlist.
    Explicit,
    /// Discovered below a watched directory.
    Implicit,
}

impl fmt::Display for WatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WatchType::Explicit => "explicit",
            WatchType::Implicit => "implicit",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub id: EntryId,
    pub watch_type: WatchType,
    pub version: u64,
}

impl ReportLine {
    pub fn copied(&self) -> bool {
        self.version > 0
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.copied() { "copied" } else { "not copied" };
        write!(
            f,
            "File: {}   watchtype: {}  version: {}   status: {}",
            self.id, self.watch_type, self.version, status
        )
    }
}

/// One line per id the cache knows about (sorted by id), then one line per
/// explicit watchlist entry the cache never saw unless the provider says it
/// is a directory.
pub fn build_report(
    cache: &dyn ChangeCache,
    watchlist: &[EntryId],
    provider: &dyn MetadataProvider,
) -> Vec<ReportLine> {
    let explicit: HashSet<&EntryId> = watchlist.iter().collect();

    let mut keys = cache.all_keys();
    keys.sort();
    let known: HashSet<EntryId> = keys.iter().cloned().collect();

    let mut lines: Vec<ReportLine> = keys
        .into_iter()
        .map(|id| {
            let (_, version) = cache.get(&id);
            let watch_type = if explicit.contains(&id) {
                WatchType::Explicit
            } else {
                WatchType::Implicit
            };
            ReportLine {
                id,
                watch_type,
                version,
            }
        })
        .collect();

    for id in watchlist.iter().filter(|id| !known.contains(*id)) {
        let is_directory = provider
            .retrieve_metadata(id)
            .map(|m| m.is_directory)
            .unwrap_or(false);
        if !is_directory {
            lines.push(ReportLine {
                id: id.clone(),
                watch_type: WatchType::Explicit,
                version: 0,
            });
        }
    }

    lines
}

pub fn log_report(lines: &[ReportLine]) {
    info!("watch log:");
    for line in lines {
        info!("{line}");
    }
}
