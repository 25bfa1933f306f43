//! Error types for the store module.

use thiserror::Error;

use crate::codec::CodecError;

/// Errors that can occur while opening or using a store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open {location}: {source}")]
    Open {
        location: String,
        #[source]
        source: fjall::Error,
    },

    #[error("invalid bucket name '{0}': {1}")]
    InvalidBucket(String, &'static str),

    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    #[error("Fjall error: {0}")]
    Backend(#[from] fjall::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl StoreError {
    /// Returns `true` if the store could not be opened at all.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::InvalidBucket(..))
    }
}
