// src/provider/mod.rs

//! Metadata provider abstraction.
//!
//! The monitor only ever talks to a [`MetadataProvider`]; it does not care
//! whether entries live on a local disk, a network store or an in-memory
//! synthetic tree.
//!
//! - [`LocalFsProvider`] exposes a local directory tree.
//! - [`mock::MockProvider`] is an in-memory tree used by fixtures and tests.

use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use anyhow::Context;
use tracing::{info, warn};

use crate::errors::{Result, WatchcopyError};
use crate::types::{EntryId, Metadata};

pub mod mock;

/// Capability interface the monitor needs from a storage backend.
///
/// Implementations must tolerate concurrent calls for different ids.
pub trait MetadataProvider: Send + Sync + Debug {
    /// Attributes of a single entry. Fails with `NotFound` for unknown ids.
    fn retrieve_metadata(&self, id: &EntryId) -> Result<Metadata>;

    /// Metadata of every direct child of a directory.
    ///
    /// The root id (empty) must be supported. Fails with `NotFound` for
    /// unknown ids and `NotADirectory` for files.
    fn get_children(&self, id: &EntryId) -> Result<Vec<Metadata>>;

    /// Replicate the current content of a file, tagged with `version`.
    ///
    /// Fails with `IsADirectory` for directories and `NotFound` for unknown ids.
    fn copy_file(&self, id: &EntryId, version: u64) -> Result<()>;
}

/// Provider backed by a local directory.
///
/// Entry ids are `/`-separated paths relative to `root`. The copy action is
/// a logged side effect; no bytes are moved.
#[derive(Debug, Clone)]
pub struct LocalFsProvider {
    root: PathBuf,
}

impl LocalFsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &EntryId) -> PathBuf {
        if id.is_root() {
            self.root.clone()
        } else {
            self.root.join(id.as_str())
        }
    }

    fn stat(&self, id: &EntryId) -> Result<fs::Metadata> {
        let path = self.resolve(id);
        fs::metadata(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => WatchcopyError::NotFound(id.clone()),
            _ => WatchcopyError::IoError(err),
        })
    }
}

fn child_id(parent: &EntryId, name: &str) -> EntryId {
    if parent.is_root() {
        EntryId::new(name)
    } else {
        EntryId::new(format!("{}/{}", parent.as_str(), name))
    }
}

/// Whole milliseconds in `elapsed`; fails if they do not fit in an `i64`.
pub(crate) fn millis(elapsed: Duration) -> Result<i64> {
    i64::try_from(elapsed.as_millis()).map_err(|_| {
        WatchcopyError::Other(anyhow::anyhow!("timestamp out of range: {elapsed:?}"))
    })
}

fn modified_millis(meta: &fs::Metadata) -> Result<i64> {
    let modified = meta.modified()?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .context("modification time before Unix epoch")?;
    millis(since_epoch)
}

impl MetadataProvider for LocalFsProvider {
    fn retrieve_metadata(&self, id: &EntryId) -> Result<Metadata> {
        let meta = self.stat(id)?;
        Ok(Metadata {
            id: id.clone(),
            last_modified: modified_millis(&meta)?,
            is_directory: meta.is_dir(),
        })
    }

    fn get_children(&self, id: &EntryId) -> Result<Vec<Metadata>> {
        if !self.stat(id)?.is_dir() {
            return Err(WatchcopyError::NotADirectory(id.clone()));
        }

        let path = self.resolve(id);
        let mut names = Vec::new();
        for entry in fs::read_dir(&path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(?raw, parent = %id, "skipping entry with non UTF-8 name"),
            }
        }
        names.sort();

        let mut children = Vec::with_capacity(names.len());
        for name in names {
            let child = child_id(id, &name);
            match self.retrieve_metadata(&child) {
                Ok(meta) => children.push(meta),
                // Removed between read_dir and stat.
                Err(WatchcopyError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(children)
    }

    fn copy_file(&self, id: &EntryId, version: u64) -> Result<()> {
        if self.stat(id)?.is_dir() {
            return Err(WatchcopyError::IsADirectory(id.clone()));
        }
        info!(entry = %id, version, "copying file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn local_provider_lists_children_with_relative_ids() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("docs"))?;
        fs::write(dir.path().join("docs/a.txt"), b"a")?;
        fs::write(dir.path().join("top.txt"), b"top")?;

        let provider = LocalFsProvider::new(dir.path());

        let root_children = provider.get_children(&EntryId::root())?;
        let ids: Vec<&str> = root_children.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["docs", "top.txt"]);
        assert!(root_children[0].is_directory);
        assert!(root_children[1].last_modified > 0);

        let nested = provider.get_children(&EntryId::from("docs"))?;
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].id.as_str(), "docs/a.txt");
        Ok(())
    }

    #[test]
    fn millis_rejects_out_of_range_durations() {
        assert_eq!(millis(Duration::from_millis(1_500)).unwrap(), 1_500);
        assert!(matches!(millis(Duration::MAX), Err(WatchcopyError::Other(_))));
    }

    #[test]
    fn local_provider_reports_kind_mismatches() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("docs"))?;
        fs::write(dir.path().join("top.txt"), b"top")?;

        let provider = LocalFsProvider::new(dir.path());

        assert!(matches!(
            provider.get_children(&EntryId::from("top.txt")),
            Err(WatchcopyError::NotADirectory(_))
        ));
        assert!(matches!(
            provider.copy_file(&EntryId::from("docs"), 1),
            Err(WatchcopyError::IsADirectory(_))
        ));
        assert!(matches!(
            provider.retrieve_metadata(&EntryId::from("missing")),
            Err(WatchcopyError::NotFound(_))
        ));
        provider.copy_file(&EntryId::from("top.txt"), 3)?;
        Ok(())
    }
}
