// src/config/mod.rs

//! Configuration loading and validation for watchcopy.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the source section and build the typed config (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_relative_to};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, Source, SourceSection};
pub use validate::validate_raw_config;
