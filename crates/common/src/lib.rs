//! Sitediff Common Library
//!
//! Shared configuration, snapshot types and the key-set differ used by the
//! comparison engine and the command line.

pub mod config;
pub mod error;
pub mod keys;
pub mod types;

// Re-export commonly used types
pub use config::{Environment, Environments, RunConfig};
pub use error::{ConfigError, Result};
pub use keys::{diff_keys, KeySetDiff};
pub use types::{DocumentSize, PropertyMap, PropertyValue, Snapshot};

/// Sitediff version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sitediff.toml";
