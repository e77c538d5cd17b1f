//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the configuration error
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid base URL for environment '{id}': {source}")]
    InvalidUrl {
        id: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
