//! Storage backends and driver resolution.
//!
//! Every backend is one variant of [`Store`] and one variant of [`Driver`].
//! Callers only ever see the `get`/`set` contract, so adding a backend means
//! adding a variant here and nothing else.

mod error;
mod fjall;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::codec::{CodecKind, known_names};
use crate::logging::info;

pub use self::error::StoreError;
pub use self::fjall::{DEFAULT_BUCKET, FjallOptions, FjallStore};

/// Storage engines selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Driver {
    /// Embedded LSM-tree database; one keyspace per bucket.
    #[default]
    Fjall,
}

impl Driver {
    /// Every selectable driver, in the order they are listed to users.
    pub const ALL: &'static [Driver] = &[Driver::Fjall];

    /// The name used on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            Driver::Fjall => "fjall",
        }
    }

    /// Comma-separated list of every driver name.
    pub fn names() -> String {
        known_names(Self::ALL.iter().map(|d| d.name()))
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unrecognized driver name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown driver '{0}' (expected one of: {list})", list = Driver::names())]
pub struct UnknownDriver(pub String);

impl FromStr for Driver {
    type Err = UnknownDriver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Driver::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownDriver(s.to_string()))
    }
}

/// An open store bound to one bucket and one codec.
pub enum Store {
    Fjall(FjallStore),
}

impl Store {
    /// Look up `key` in the bound bucket. `Ok(None)` means the key is absent.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self {
            Store::Fjall(store) => store.get(key),
        }
    }

    /// Write or overwrite the value stored under `key`.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        match self {
            Store::Fjall(store) => store.set(key, value),
        }
    }

    /// The driver backing this store.
    pub fn driver(&self) -> Driver {
        match self {
            Store::Fjall(_) => Driver::Fjall,
        }
    }

    /// Name of the bound bucket.
    pub fn bucket(&self) -> &str {
        match self {
            Store::Fjall(store) => store.bucket(),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Store::Fjall(store) => f
                .debug_struct("Store::Fjall")
                .field("path", &store.path())
                .field("bucket", &store.bucket())
                .finish(),
        }
    }
}

/// Open the store selected by `driver` at `location`, bound to `bucket` and `codec`.
///
/// Opening is synchronous. The returned store is ready for use.
pub fn resolve(
    driver: Driver,
    location: &Path,
    bucket: &str,
    codec: CodecKind,
) -> Result<Store, StoreError> {
    info!(%driver, location = %location.display(), bucket, %codec, "resolving store");

    match driver {
        Driver::Fjall => {
            let options = FjallOptions {
                path: location.to_path_buf(),
                bucket: bucket.to_string(),
                codec,
            };
            FjallStore::open(options).map(Store::Fjall)
        }
    }
}
