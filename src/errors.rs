// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::EntryId;

#[derive(Error, Debug)]
pub enum WatchcopyError {
    #[error("Entry not found: {0}")]
    NotFound(EntryId),

    #[error("Entry is not a directory: {0}")]
    NotADirectory(EntryId),

    #[error("Entry is a directory: {0}")]
    IsADirectory(EntryId),

    #[error("Monitor not started")]
    NotStarted,

    #[error("Monitor already started")]
    AlreadyStarted,

    #[error("Monitor has been shut down and cannot be restarted")]
    Terminated,

    #[error("Dispatch queue closed unexpectedly")]
    QueueClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchcopyError>;
