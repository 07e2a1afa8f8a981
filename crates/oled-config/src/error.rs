//! Config-layer error kinds (spec.md §7).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("config at {path:?} failed validation: field `{field}`: {reason}")]
    Validation { path: Option<PathBuf>, field: String, reason: String },

    #[error("failed to read or write config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Validation { path: None, field: field.into(), reason: reason.into() }
    }
}
