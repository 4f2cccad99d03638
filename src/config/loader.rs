//! Settings file loading
//!
//! The CLI looks for `ksp-version-gate.toml` in the working directory unless
//! `--config` names a file. Only an explicitly named file has to exist.

use crate::config::schema::Settings;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read settings from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings{}: {source}", origin(path.as_deref()))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },
}

fn origin(path: Option<&Path>) -> String {
    path.map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

pub fn load_from_str(input: &str) -> Result<Settings, ConfigError> {
    toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml { path: None, source })
}

/// Load settings from `path`, which must exist.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    toml_edit::de::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: Some(path.to_path_buf()),
        source,
    })
}

/// Load settings from `path` if it exists, `None` otherwise.
pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Settings>, ConfigError> {
    match load_from_path(path) {
        Ok(settings) => Ok(Some(settings)),
        Err(ConfigError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
