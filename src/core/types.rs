//! Core type definitions for the leaderboard
//!
//! Players, ranked entries and the aggregate shapes returned by the store.
//! Wire names follow the public JSON API (`username`, `rating`).

use serde::{Deserialize, Serialize};

/// Score held by a player
pub type Score = u32;

/// 1-based dense rank
pub type Rank = u32;

/// Lowest score a player can hold
pub const MIN_SCORE: Score = 100;

/// Highest score a player can hold
pub const MAX_SCORE: Score = 5000;

/// Clamp an arbitrary signed score into `[MIN_SCORE, MAX_SCORE]`
pub fn clamp_score(raw: i64) -> Score {
    raw.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as Score
}

/// A ranked player record
///
/// The id never changes after creation and the name is the player's identity.
/// The score is only mutated through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identifier
    pub id: String,
    /// Unique, case-sensitive display name
    #[serde(rename = "username")]
    pub name: String,
    /// Current score
    #[serde(rename = "rating")]
    pub score: Score,
}

impl Player {
    /// Create a new player record
    pub fn new(id: impl Into<String>, name: impl Into<String>, score: Score) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score,
        }
    }
}

/// A player annotated with its dense rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Dense rank of the player's score
    pub rank: Rank,
    /// Player name
    #[serde(rename = "username")]
    pub name: String,
    /// Player score
    #[serde(rename = "rating")]
    pub score: Score,
}

impl RankedEntry {
    /// Create a new ranked entry
    pub fn new(rank: Rank, name: impl Into<String>, score: Score) -> Self {
        Self {
            rank,
            name: name.into(),
            score,
        }
    }
}

/// One page of the global ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Entries in ranking order
    pub entries: Vec<RankedEntry>,
    /// Total number of players at the time of the read
    pub total: usize,
}

impl Page {
    /// Whether more entries follow the requested window
    pub fn has_more(&self, limit: usize, offset: usize) -> bool {
        offset.saturating_add(limit) < self.total
    }
}

/// Population statistics
///
/// `min` and `max` are zero when the store is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of players
    pub total: usize,
    /// Lowest score present
    pub min: Score,
    /// Highest score present
    pub max: Score,
}
