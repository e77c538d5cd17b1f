//! Run configuration: the environments under comparison and the paths to test

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// A named deployment target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Identifier, also used as the screenshot file stem
    pub id: String,

    /// Display name
    pub name: String,

    /// Base URL that path segments are appended to
    pub base_url: String,
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// URL of `path` within this environment: `{base_url}/{path}`
    pub fn page_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// File name of this environment's screenshot inside a path directory
    pub fn screenshot_file(&self) -> String {
        format!("{}.png", self.id)
    }

    fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ConfigError::InvalidConfig(format!(
                "environment '{}' has an empty id",
                self.name
            )));
        }

        let url = url::Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            id: self.id.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidConfig(format!(
                "environment '{}' uses unsupported scheme '{}'",
                self.id, other
            ))),
        }
    }
}

/// The two environments every path is captured in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environments {
    pub staging: Environment,
    pub production: Environment,
}

impl Environments {
    /// Both environments, staging first
    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        [&self.staging, &self.production].into_iter()
    }
}

impl Default for Environments {
    fn default() -> Self {
        Self {
            staging: Environment::new(
                "staging",
                "staging",
                "https://www.staging.aws.investopedia.com",
            ),
            production: Environment::new("production", "production", "https://www.investopedia.com"),
        }
    }
}

/// Immutable configuration for one comparison run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Top-level results directory
    pub results_dir: PathBuf,

    /// Environments under comparison
    pub environments: Environments,

    /// Path segments appended to each environment's base URL
    pub paths: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            environments: Environments::default(),
            paths: vec![
                "trump".to_string(),
                "bitcoin".to_string(),
                "markets".to_string(),
            ],
        }
    }
}

impl RunConfig {
    /// Load configuration from a TOML file, or the built-in defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using built-in defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check that the configuration can be run
    pub fn validate(&self) -> Result<()> {
        for env in self.environments.iter() {
            env.validate()?;
        }

        if self.environments.staging.id == self.environments.production.id {
            return Err(ConfigError::InvalidConfig(format!(
                "staging and production share the id '{}'",
                self.environments.staging.id
            )));
        }

        if self.paths.is_empty() {
            return Err(ConfigError::InvalidConfig("no paths configured".to_string()));
        }

        let mut seen = HashSet::new();
        for path in &self.paths {
            if path.is_empty() {
                return Err(ConfigError::InvalidConfig("empty path segment".to_string()));
            }
            // Would resolve to the results directory itself or its parent
            if path == "." || path == ".." {
                return Err(ConfigError::InvalidConfig(format!(
                    "path segment '{}' has no results directory of its own",
                    path
                )));
            }
            if !seen.insert(path.as_str()) {
                return Err(ConfigError::InvalidConfig(format!("duplicate path '{}'", path)));
            }
        }

        Ok(())
    }

    /// Results directory for one path, keyed by its percent-encoded segment
    pub fn path_dir(&self, path: &str) -> PathBuf {
        self.results_dir.join(urlencoding::encode(path).as_ref())
    }
}
