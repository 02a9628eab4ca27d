use std::fmt;

use serde::Deserialize;

/// Opaque identifier of a file or directory on the backend.
///
/// The empty id denotes the root directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of the backend's root directory.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Attributes of a single entry as reported by a provider.
///
/// Only valid for the evaluation cycle in which it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub id: EntryId,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    pub is_directory: bool,
}

impl Metadata {
    pub fn file(id: impl Into<EntryId>, last_modified: i64) -> Self {
        Self {
            id: id.into(),
            last_modified,
            is_directory: false,
        }
    }

    pub fn directory(id: impl Into<EntryId>, last_modified: i64) -> Self {
        Self {
            id: id.into(),
            last_modified,
            is_directory: true,
        }
    }
}

/// Snapshot of what the change cache knows about one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub id: EntryId,
    pub last_modified: i64,
    /// 0 until the first detected change; +1 for every change after that.
    pub version: u64,
}
