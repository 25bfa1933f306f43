//! Library-level log macros.
//!
//! With the `logging` feature these forward to `tracing`; without it they
//! expand to nothing. Library code never writes to stdout, so a subscriber
//! installed by the binary decides where events end up.
//!
//! ```rust,ignore
//! use crate::logging::{debug, info};
//!
//! info!(%driver, location = %path.display(), "resolving store");
//! debug!(bucket = %name, "opening keyspace");
//! ```

/// Emit a trace-level log (very detailed internal operations).
#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

/// Emit a debug-level log (operation details useful for debugging).
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Emit an info-level log (high-level lifecycle events).
#[cfg(feature = "logging")]
macro_rules! log_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

/// Emit a warn-level log (unexpected but handled situations).
#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub(crate) use log_debug as debug;
pub(crate) use log_info as info;
pub(crate) use log_trace as trace;
// Only the signal listener warns, and it needs the `cli` feature.
#[allow(unused_imports)]
pub(crate) use log_warn as warn;
