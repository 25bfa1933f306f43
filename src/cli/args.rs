//! Flags and positional handling shared by every command.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::codec::CodecKind;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{self, DEFAULT_BUCKET, Driver, Store};

/// Store selection flags.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreFlags {
    /// Store type, one of 'fjall' [default: fjall]
    #[arg(long, env = "KVCTL_DRIVER", value_name = "NAME")]
    pub driver: Option<String>,

    /// Bucket (namespace) inside the store [default: bucket]
    #[arg(long, env = "KVCTL_BUCKET", value_name = "NAME")]
    pub bucket: Option<String>,

    /// Byte encoding for values, one of 'none' [default: none]
    #[arg(long, env = "KVCTL_CODEC", value_name = "NAME")]
    pub codec: Option<String>,

    /// TOML file providing defaults for the flags above
    #[arg(long, env = "KVCTL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Validated store selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub driver: Driver,
    pub bucket: String,
    pub codec: CodecKind,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            driver: Driver::default(),
            bucket: DEFAULT_BUCKET.to_string(),
            codec: CodecKind::default(),
        }
    }
}

impl StoreFlags {
    /// Merge flags with the config file and validate the names.
    ///
    /// Flags (and their environment variables) take precedence over the
    /// config file, which takes precedence over built-in defaults.
    pub fn select(&self) -> Result<Selection> {
        let config = Config::load(self.config.as_deref())?;
        let defaults = config.store;

        let driver = self
            .driver
            .as_deref()
            .or(defaults.driver.as_deref())
            .map(str::parse::<Driver>)
            .transpose()?
            .unwrap_or_default();
        let codec = self
            .codec
            .as_deref()
            .or(defaults.codec.as_deref())
            .map(str::parse::<CodecKind>)
            .transpose()?
            .unwrap_or_default();
        let bucket = self
            .bucket
            .clone()
            .or(defaults.bucket)
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());

        Ok(Selection {
            driver,
            bucket,
            codec,
        })
    }
}

impl Selection {
    /// Open the selected store at `location`.
    pub fn open(&self, location: &Path) -> Result<Store> {
        store::resolve(self.driver, location, &self.bucket, self.codec).map_err(|source| {
            Error::Open {
                driver: self.driver.to_string(),
                source,
            }
        })
    }
}

/// Fail with a usage error unless `min <= got <= max`.
pub(crate) fn check_arity(got: usize, min: usize, max: usize) -> Result<()> {
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{}-{}", min, max)
    };
    if got < min {
        return Err(Error::usage(format!(
            "Not enough arguments (expected {}, got {})",
            expected, got
        )));
    }
    if got > max {
        return Err(Error::usage(format!(
            "Too many arguments (expected {}, got {})",
            expected, got
        )));
    }
    Ok(())
}

/// Raw bytes of a command-line argument.
pub(crate) fn arg_bytes(arg: OsString) -> Vec<u8> {
    arg.into_encoded_bytes()
}
