// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** check that the
/// source section is coherent. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks that exactly one source is configured and that its settings
///   make sense.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `Watchcopy.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Watchcopy.toml")
}

/// Resolve `path` against the directory holding the config file.
///
/// Absolute paths are returned unchanged; a bare config file name (no parent)
/// leaves relative paths relative to the working directory.
pub fn resolve_relative_to(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::config::model::Source;

    #[test]
    fn defaults_apply_when_config_section_is_missing() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[source]
datafile = "fixture.json"
"#
        )
        .unwrap();

        let cfg = load_and_validate(file.path()).unwrap();
        assert_eq!(cfg.config.watch_interval_ms, 100);
        assert_eq!(cfg.config.queue_capacity, 100);
        assert_eq!(
            cfg.source,
            Source::Fixture {
                datafile: PathBuf::from("fixture.json")
            }
        );
    }

    #[test]
    fn relative_paths_follow_the_config_directory() {
        assert_eq!(
            resolve_relative_to(Path::new("conf/Watchcopy.toml"), Path::new("data.json")),
            PathBuf::from("conf/data.json")
        );
        assert_eq!(
            resolve_relative_to(Path::new("Watchcopy.toml"), Path::new("data.json")),
            PathBuf::from("data.json")
        );
        assert_eq!(
            resolve_relative_to(Path::new("conf/Watchcopy.toml"), Path::new("/abs/data.json")),
            PathBuf::from("/abs/data.json")
        );
    }
}
