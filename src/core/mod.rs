//! Core system types and foundations
//!
//! Type definitions, error handling, configuration, logging and the shared
//! application state.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod app_state;
pub mod factory;

// Re-export commonly used items
pub use types::{Player, Rank, RankedEntry, Score, Page, Stats};
pub use error::{Error, Result};
pub use config::Config;
pub use app_state::AppState;
