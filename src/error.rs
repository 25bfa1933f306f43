//! Unified error type for kvctl.
//!
//! Every failure a command can hit is one variant of [`Error`]. The command
//! renders it as a single diagnostic line and exits with status 1, so the
//! `Display` text of each variant is what an operator reads.

use std::io;

use thiserror::Error;

use crate::codec::UnknownCodec;
#[cfg(feature = "cli")]
use crate::config::ConfigError;
use crate::store::{StoreError, UnknownDriver};

/// Errors produced by a single get or put invocation.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad argument count or flags; raised before any I/O.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    UnsupportedDriver(#[from] UnknownDriver),

    #[error(transparent)]
    UnsupportedCodec(#[from] UnknownCodec),

    /// The backend could not open the location or bucket.
    #[error("opening {driver} store: {source}")]
    Open {
        driver: String,
        #[source]
        source: StoreError,
    },

    /// The key is absent from the bucket.
    #[error("key {0:?} doesn't exist")]
    KeyNotFound(String),

    #[error("reading key {key:?}: {source}")]
    Read {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("writing key {key:?}: {source}")]
    Write {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("reading value from stdin: {0}")]
    Input(#[source] io::Error),

    #[error("writing output: {0}")]
    Output(#[source] io::Error),

    #[cfg(feature = "cli")]
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The async runtime could not start, or the storage task died.
    #[error("runtime failure: {0}")]
    Runtime(String),

    #[error("interrupted")]
    Interrupted,
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a usage error from a message.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Returns `true` if the command line itself was rejected.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Returns `true` if a driver or codec name was not recognized.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedDriver(_) | Self::UnsupportedCodec(_))
    }

    /// Returns `true` if the looked-up key was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
    }
}

/// Printable form of a key for messages. Non-UTF-8 bytes are replaced.
#[cfg_attr(not(feature = "cli"), allow(dead_code))]
pub(crate) fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::KeyNotFound(display_key(b"greeting"));
        assert_eq!(err.to_string(), r#"key "greeting" doesn't exist"#);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unsupported_driver_is_transparent() {
        let err = Error::from(UnknownDriver("nosuch".to_string()));
        assert!(err.is_unsupported());
        assert!(err.to_string().starts_with("unknown driver 'nosuch'"));
    }

    #[test]
    fn test_display_key_lossy() {
        assert_eq!(display_key(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }
}
