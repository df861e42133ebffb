//! Replacement plan loading
//!
//! Plans are parsed and validated in one pass. A plan read from disk is
//! anchored to its file: every error names it, and its directory is where
//! `base_relative` entries resolve unless the caller picks another base.

use crate::config::schema::{ReplaceConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read replacement plan {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse replacement plan{}: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("invalid replacement plan{}: {source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" ({})", path.display()))
        .unwrap_or_default()
}

/// Parse and validate plan text that did not come from a file.
pub fn load_from_str(input: &str) -> Result<ReplaceConfig, ConfigError> {
    parse(input, None)
}

/// Read, parse and validate the plan at `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ReplaceConfig, ConfigError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&input, Some(path))
}

/// Directory that `base_relative` entries of the plan at `plan` resolve
/// against by default.
pub fn plan_base_dir(plan: &Path) -> PathBuf {
    match plan.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn parse(input: &str, origin: Option<&Path>) -> Result<ReplaceConfig, ConfigError> {
    let path = || origin.map(Path::to_path_buf);

    let config: ReplaceConfig = toml_edit::de::from_str(input).map_err(|source| {
        ConfigError::Toml {
            path: path(),
            source,
        }
    })?;
    config.validate().map_err(|source| ConfigError::Validation {
        path: path(),
        source,
    })?;

    Ok(config)
}
