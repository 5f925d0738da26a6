//! Logging utilities
//!
//! Thin macros over `tracing` so call sites stay uniform, plus subscriber
//! installation driven by [`LoggingConfig`].

use tracing_subscriber::EnvFilter;

use crate::core::config::LoggingConfig;
use crate::core::error::{Error, Result};

/// Info level logging - general information messages
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        tracing::info!($($arg)*);
    }};
}

/// Warning level logging - potentially problematic situations
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        tracing::warn!($($arg)*);
    }};
}

/// Error level logging - error conditions
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        tracing::error!($($arg)*);
    }};
}

/// Debug level logging - detailed information for debugging
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        tracing::debug!($($arg)*);
    }};
}

/// Trace level logging - very detailed tracing information
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        tracing::trace!($($arg)*);
    }};
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    installed.map_err(|e| Error::internal(format!("Failed to install tracing subscriber: {}", e)))
}
