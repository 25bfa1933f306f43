//! Tracing subscriber setup for the binary.
//!
//! Events always go to stderr so that `get` output on stdout stays
//! byte-exact. The filter comes from `KVCTL_LOG` (EnvFilter syntax) and the
//! format from `KVCTL_LOG_FORMAT` (`text` or `json`).

use std::io::{self, IsTerminal};
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Variable holding the log filter.
pub const LOG_ENV: &str = "KVCTL_LOG";
/// Variable holding the log format.
pub const LOG_FORMAT_ENV: &str = "KVCTL_LOG_FORMAT";

/// Filter used when `KVCTL_LOG` is unset; quiet unless something goes wrong.
const DEFAULT_FILTER: &str = "warn";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// EnvFilter directives, e.g. `kvctl=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Build from `KVCTL_LOG` and `KVCTL_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_values(
            std::env::var(LOG_ENV).ok(),
            std::env::var(LOG_FORMAT_ENV).ok(),
        )
    }

    /// Build from optional raw values; unset or blank values fall back to defaults.
    pub fn from_values(
        filter: Option<String>,
        format: Option<String>,
    ) -> Result<Self, LoggingError> {
        let filter = filter
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = match format.as_deref().map(str::trim) {
            Some(f) if !f.is_empty() => f.parse()?,
            _ => LogFormat::default(),
        };
        Ok(Self { filter, format })
    }
}

/// Install the global subscriber writing to stderr.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    match config.format {
        LogFormat::Text => {
            let layer = fmt::layer()
                .with_ansi(io::stderr().is_terminal())
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .with_writer(io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .map_err(|e| LoggingError::Init(e.to_string()))
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_span_events(FmtSpan::NONE)
                .with_writer(io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .map_err(|e| LoggingError::Init(e.to_string()))
        }
    }
}

/// Errors that can occur during logging initialization.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid log format '{0}' (expected 'text' or 'json')")]
    InvalidFormat(String),

    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<(), LoggingError> {
        assert_eq!(LoggingConfig::from_values(None, None)?, LoggingConfig::default());
        let blank = LoggingConfig::from_values(Some("  ".into()), Some(String::new()))?;
        assert_eq!(blank.filter, "warn");
        assert_eq!(blank.format, LogFormat::Text);
        Ok(())
    }

    #[test]
    fn test_from_values() -> Result<(), LoggingError> {
        let config =
            LoggingConfig::from_values(Some("kvctl=debug".into()), Some("JSON".into()))?;
        assert_eq!(config.filter, "kvctl=debug");
        assert_eq!(config.format, LogFormat::Json);
        Ok(())
    }

    #[test]
    fn test_invalid_format() {
        assert!(matches!(
            LoggingConfig::from_values(None, Some("xml".into())),
            Err(LoggingError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LoggingConfig {
            filter: "kvctl=notalevel".to_string(),
            format: LogFormat::Text,
        };
        assert!(matches!(init(&config), Err(LoggingError::InvalidFilter(_))));
    }
}
