//! Application State Management
//!
//! The `AppState` handed to every HTTP handler and background task. Built once
//! by the factory; cloning it only bumps reference counts.

use std::sync::Arc;
use std::time::Instant;

use crate::core::config::Config;
use crate::storage::RankedStore;

/// Central application state holding shared services
#[derive(Clone)]
pub struct AppState {
    /// The leaderboard store
    pub store: Arc<RankedStore>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState around an existing store
    pub fn new(store: Arc<RankedStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
