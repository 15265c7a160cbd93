//! Catalog runtime configuration.
//!
//! # Responsibility
//! - Describe where the store lives, how logging is set up and the default
//!   page size for list requests.
//! - Load settings from an optional TOML file, then apply environment
//!   overrides.
//!
//! # Invariants
//! - Missing keys fall back to `CatalogConfig::default()`.
//! - Environment overrides win over file values.

use crate::logging::default_log_level;
use crate::query::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DATABASE_PATH: &str = "CATALOG_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "CATALOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CATALOG_LOG_DIR";
pub const ENV_DEFAULT_LIMIT: &str = "CATALOG_DEFAULT_LIMIT";

const DEFAULT_DATABASE_FILE: &str = "catalog.sqlite3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: &'static str, value: String },
}

/// Root catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory; logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Page size used when a list request omits `limit`.
    pub default_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl CatalogConfig {
    /// Loads `path` (when given) and applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()
    }

    /// Applies overrides resolved through `lookup` (normally the process
    /// environment).
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.log_dir = if value.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        if let Some(value) = lookup(ENV_DEFAULT_LIMIT) {
            self.default_limit = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_DEFAULT_LIMIT,
                value: value.clone(),
            })?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "default_limit",
                value: "0".to_string(),
            });
        }
        Ok(self)
    }
}
