//! Store backend using fjall.

use std::path::{Path, PathBuf};

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::codec::{Codec, CodecKind};
use crate::logging::{debug, trace};

use super::error::StoreError;

/// Bucket used when none is given.
pub const DEFAULT_BUCKET: &str = "bucket";

/// Largest key fjall accepts.
const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Longest bucket (keyspace) name accepted.
const MAX_BUCKET_LEN: usize = 255;

/// Options for opening a [`FjallStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FjallOptions {
    /// Database directory.
    pub path: PathBuf,
    /// Keyspace holding the bucket's keys.
    pub bucket: String,
    /// Codec applied to every value.
    pub codec: CodecKind,
}

impl Default for FjallOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kvctl.db"),
            bucket: DEFAULT_BUCKET.to_string(),
            codec: CodecKind::default(),
        }
    }
}

/// A single bucket of a fjall database.
pub struct FjallStore {
    db: fjall::Database,
    path: PathBuf,
    bucket: Keyspace,
    bucket_name: String,
    codec: CodecKind,
}

impl FjallStore {
    /// Open (creating if needed) the database and bucket described by `options`.
    pub fn open(options: FjallOptions) -> Result<Self, StoreError> {
        validate_bucket(&options.bucket)?;

        let location = options.path.display().to_string();
        debug!(path = %location, bucket = %options.bucket, "opening fjall store");

        let db = fjall::Database::builder(&options.path)
            .open()
            .map_err(|source| StoreError::Open {
                location: location.clone(),
                source,
            })?;
        let bucket = db
            .keyspace(&options.bucket, KeyspaceCreateOptions::default)
            .map_err(|source| StoreError::Open { location, source })?;

        Ok(Self {
            db,
            path: options.path,
            bucket,
            bucket_name: options.bucket,
            codec: options.codec,
        })
    }

    /// Name of the bound bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket_name
    }

    /// Look up `key`; `Ok(None)` when it is absent.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        trace!(bucket = %self.bucket_name, key_len = key.len(), "get");

        let Some(stored) = self.bucket.get(key)? else {
            return Ok(None);
        };
        Ok(Some(self.codec.decode(&stored)?))
    }

    /// Write `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        trace!(bucket = %self.bucket_name, key_len = key.len(), value_len = value.len(), "set");

        let encoded = self.codec.encode(value)?;
        self.bucket.insert(key, encoded.as_slice())?;
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    /// Path the database was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn validate_bucket(name: &str) -> Result<(), StoreError> {
    let invalid = |reason: &'static str| -> Result<(), StoreError> {
        Err(StoreError::InvalidBucket(name.to_string(), reason))
    };

    if name.is_empty() {
        return invalid("must not be empty");
    }
    if name.len() > MAX_BUCKET_LEN {
        return invalid("longer than 255 bytes");
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
    {
        return invalid("only ASCII letters, digits, '_', '-' and '.' are allowed");
    }
    Ok(())
}

fn validate_key(key: &[u8]) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::InvalidKey("key is longer than 65535 bytes"));
    }
    Ok(())
}
