//! Read and write single key/value pairs in an embedded key-value store.
//!
//! A store is picked at run time by driver name, opened at a location and
//! bound to one bucket and one codec:
//!
//! ```ignore
//! use kvctl::{CodecKind, Driver, resolve};
//!
//! let store = resolve(Driver::Fjall, "data.db".as_ref(), "bucket", CodecKind::None)?;
//! store.set(b"greeting", b"hello")?;
//! assert_eq!(store.get(b"greeting")?, Some(b"hello".to_vec()));
//! ```
//!
//! # Modules
//!
//! - [`codec`] - Value codecs (identity only, for now)
//! - [`store`] - Store contract, drivers and resolution
//! - [`cancel`] - Interrupt signals bridged to a cancellation token (requires `cli` feature)
//! - [`cli`] - The `get` and `put` commands and their dispatcher (requires `cli` feature)
//! - [`config`] - TOML defaults for the command flags (requires `cli` feature)
//!
//! # Feature Flags
//!
//! - `cli` - Commands, config file, signal handling and the `kvctl` binary (enabled by default)
//! - `logging` - Library-level tracing; consumers provide their own subscriber (enabled by default)

#[cfg(feature = "cli")]
pub mod cancel;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
#[cfg(feature = "cli")]
pub mod config;
mod logging;
pub mod store;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use codec::{Codec, CodecError, CodecKind, NoCodec};
pub use store::{Driver, Store, StoreError, resolve};
