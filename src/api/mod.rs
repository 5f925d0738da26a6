//! # API Module
//!
//! HTTP interface for the leaderboard.
//!
//! ## Endpoints Overview
//!
//! ### Ranking
//! - `GET /api/leaderboard?limit&offset` - Page of the global ranking
//! - `GET /api/stats` - Population size and score range
//!
//! ### Users
//! - `GET /api/users/search?q&limit` - Case-insensitive name search
//! - `GET /api/users/:username` - One player's rank
//! - `POST /api/users` - Add a player
//!
//! ### Live updates (Server-Sent Events)
//! - `GET /api/stream` - Ranking page pushed on an interval
//! - `GET /api/stream/search?q` - Search results pushed on an interval
//!
//! ### System
//! - `GET /health` - Health check
//! - `GET /` - Service info
//! - `GET /metrics` - Prometheus export, on the metrics listener

pub mod handlers;
pub mod server;
pub mod stream;

// Re-export commonly used items
pub use server::{create_app, create_metrics_app, start_metrics_server, start_server};
