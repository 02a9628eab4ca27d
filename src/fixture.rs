// src/fixture.rs

//! JSON fixtures describing a synthetic tree, a watchlist and update steps.
//!
//! ```json
//! {
//!   "filesystem": [
//!     { "fileId": "dir1", "isDirectory": true, "children": [ { "fileId": "file2" } ] },
//!     { "fileId": "file1" }
//!   ],
//!   "watchlist": ["dir1"],
//!   "updates": [["file2"], []]
//! }
//! ```
//!
//! Each entry of `updates` is the set of ids touched before one evaluation
//! cycle.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::errors::{Result, WatchcopyError};
use crate::provider::mock::MockProvider;
use crate::types::EntryId;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryDescription {
    file_id: EntryId,
    #[serde(default)]
    is_directory: bool,
    #[serde(default)]
    children: Vec<EntryDescription>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    filesystem: Vec<EntryDescription>,
    #[serde(default)]
    watchlist: Vec<EntryId>,
    #[serde(default)]
    updates: Vec<Vec<EntryId>>,
}

/// A loaded fixture, ready to drive a monitor.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub provider: MockProvider,
    pub watchlist: Vec<EntryId>,
    pub updates: Vec<Vec<EntryId>>,
}

/// Read and build a fixture from a JSON file.
pub fn load_fixture(path: impl AsRef<Path>) -> Result<Fixture> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let fixture = parse_fixture(&contents)?;
    info!(
        ?path,
        entries = fixture.provider.len(),
        watchlist = fixture.watchlist.len(),
        steps = fixture.updates.len(),
        "loaded fixture"
    );
    Ok(fixture)
}

/// Build a fixture from a JSON document.
pub fn parse_fixture(json: &str) -> Result<Fixture> {
    let raw: FixtureFile = serde_json::from_str(json)?;

    let provider = MockProvider::new();
    let mut seen = HashSet::new();
    for entry in &raw.filesystem {
        add_entry(&provider, entry, &EntryId::root(), &mut seen)?;
    }

    Ok(Fixture {
        provider,
        watchlist: raw.watchlist,
        updates: raw.updates,
    })
}

fn add_entry(
    provider: &MockProvider,
    entry: &EntryDescription,
    parent: &EntryId,
    seen: &mut HashSet<EntryId>,
) -> Result<()> {
    let id = &entry.file_id;
    if id.is_root() {
        return Err(WatchcopyError::ConfigError(format!(
            "fixture entry under {parent} has an empty fileId"
        )));
    }
    if !seen.insert(id.clone()) {
        return Err(WatchcopyError::ConfigError(format!(
            "duplicate fileId in fixture: {id}"
        )));
    }

    if !entry.is_directory {
        if !entry.children.is_empty() {
            return Err(WatchcopyError::ConfigError(format!(
                "fixture file {id} has children but is not a directory"
            )));
        }
        provider.add_file(id.clone(), parent.clone());
        return Ok(());
    }

    provider.add_directory(id.clone(), parent.clone());
    for child in &entry.children {
        add_entry(provider, child, id, seen)?;
    }
    Ok(())
}
