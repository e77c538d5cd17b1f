//! Error types for page comparison

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Browser failed to launch: {0}. Ensure Chrome or Chromium is installed and on PATH")]
    BrowserLaunch(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Could not read properties of `{expression}` on {url}")]
    PropertyAccess { expression: String, url: String },

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image diff failed: {0}")]
    ImageDiff(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Config(#[from] sitediff_common::ConfigError),
}

impl E2eError {
    /// Wrap an I/O error with the path it occurred at
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        E2eError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl From<image::ImageError> for E2eError {
    fn from(e: image::ImageError) -> Self {
        E2eError::ImageDiff(e.to_string())
    }
}

impl From<tokio::task::JoinError> for E2eError {
    fn from(e: tokio::task::JoinError) -> Self {
        E2eError::Task(e.to_string())
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
