//! Optional TOML configuration file.
//!
//! The file only supplies defaults. A command-line flag or environment
//! variable always wins over it.
//!
//! ```toml
//! [store]
//! driver = "fjall"
//! bucket = "bucket"
//! codec = "none"
//! ```

use serde::Deserialize;
use std::path::Path;

/// Configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Store selector defaults.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Defaults for the store selectors shared by every command.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Driver name (e.g. "fjall").
    pub driver: Option<String>,
    /// Bucket name.
    pub bucket: Option<String>,
    /// Codec name (e.g. "none").
    pub codec: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Load from `path` if one was given, otherwise use empty defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file '{0}': {1}")]
    Io(String, #[source] std::io::Error),
    /// TOML parse error.
    #[error("Failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}
