//! Storage layer for the leaderboard
//!
//! The [`RankedStore`] owns every player and the structures derived from them:
//! the ordered ranking, score groups, the dense rank table and the name prefix
//! index. Derived structures are rebuilt lazily by the first read that needs
//! them after a write.

/// Dense rank table
pub mod rank_table;

/// Name prefix index
pub mod prefix_index;

/// Owned store aggregate
pub mod state;

/// Lock wrapper and public API
pub mod ranked_store;


pub use prefix_index::PrefixIndex;
pub use rank_table::RankTable;
pub use ranked_store::{RankedStore, RebuildStats};
pub use state::{IndexState, IndexStates, RefreshOutcome};

use crate::core::types::{Player, Score};

/// The slice of the store a score mutator needs
///
/// Kept separate so background mutation can run against any population source.
pub trait ScoreSink: Send + Sync + 'static {
    /// Number of players
    fn total_count(&self) -> usize;

    /// Player at `index mod count`, or `None` when empty
    fn pick(&self, index: usize) -> Option<Player>;

    /// Set a player's score, returning false when the name is unknown
    fn update_score(&self, name: &str, score: Score) -> bool;
}

impl ScoreSink for RankedStore {
    fn total_count(&self) -> usize {
        RankedStore::total_count(self)
    }

    fn pick(&self, index: usize) -> Option<Player> {
        RankedStore::pick(self, index)
    }

    fn update_score(&self, name: &str, score: Score) -> bool {
        RankedStore::update_score(self, name, score)
    }
}
