//! Leaderboard - a real-time ranked leaderboard service
//!
//! An in-memory store of players ranked by score with dense ranks, paging,
//! case-insensitive name search and cheap score updates. Derived indexes are
//! rebuilt lazily on the first read after a write, and concurrent readers never
//! repeat a rebuild. An axum server exposes the store over HTTP and SSE while a
//! background driver keeps scores moving.
#![warn(missing_docs)]

// Configure global allocator for maximum performance
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

// Core foundational modules
pub mod core;

// Main functional modules
pub mod storage;
pub mod api;
pub mod simulation;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::{AppState, Config, Error, Result};
pub use storage::{RankedStore, ScoreSink};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging and metrics from configuration
pub fn init(config: &Config) -> Result<()> {
    crate::core::logging::init_tracing(&config.logging)?;
    log_info!("Initializing {} v{}", NAME, VERSION);

    system::metrics::init_registry();
    Ok(())
}
