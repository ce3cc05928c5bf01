//! Library error type.
//!
//! Only configuration and report writing can fail. Scanning never does:
//! unreadable sources become `FILE_READ_ERROR` issues instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockpairError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },

    #[error("Unknown rule id '{0}' in [rules]")]
    UnknownRule(String),

    #[error("Invalid level '{level}' for rule {rule} (expected error, warning or info)")]
    InvalidLevel { rule: String, level: String },

    #[error("Invalid format '{0}' (expected human or json)")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, LockpairError>;
