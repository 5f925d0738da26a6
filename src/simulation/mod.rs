//! Synthetic load for the leaderboard
//!
//! The seeder builds the startup population; the score driver keeps it moving.

pub mod score_driver;
pub mod seeder;

pub use score_driver::ScoreDriver;
pub use seeder::{generate_players, generate_population, generate_with_ties};
