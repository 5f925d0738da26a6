//! Ranked store - concurrent access to the leaderboard state
//!
//! One `parking_lot::RwLock` guards the whole [`StoreState`]. Writes take the
//! exclusive guard for the duration of the mutation and only mark derived
//! structures stale. Reads take the shared guard; when a structure they need is
//! stale they switch to the exclusive guard, re-check the generation counters,
//! rebuild only what is still stale, and downgrade to a shared guard without
//! releasing the lock. A write therefore costs at most one rebuild no matter how
//! many readers race on it, and the read always answers from the exact state it
//! rebuilt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::state::{IndexStates, RefreshOutcome, Requirements, StoreState};
use crate::core::types::{Page, Player, Rank, RankedEntry, Score, Stats};
use crate::system::metrics::Metrics;
use crate::log_debug;

/// Number of rebuilds performed by one store since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Rank table rebuilds
    pub rank_table: u64,
    /// Ordered view re-sorts triggered by reads
    pub order: u64,
    /// Prefix index rebuilds
    pub prefix_index: u64,
}

#[derive(Debug, Default)]
struct RebuildCounters {
    rank_table: AtomicU64,
    order: AtomicU64,
    prefix_index: AtomicU64,
}

/// Thread-safe leaderboard store
///
/// Created once at startup and shared behind an `Arc` with every consumer.
#[derive(Debug, Default)]
pub struct RankedStore {
    state: RwLock<StoreState>,
    rebuilds: RebuildCounters,
}

impl RankedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // ---------- writes ----------

    /// Add a batch of players, skipping names already present
    ///
    /// The ordered view is sorted once after the batch. Returns how many
    /// players were added.
    pub fn bulk_insert(&self, players: Vec<Player>) -> usize {
        let offered = players.len();
        let (inserted, total) = {
            let mut state = self.state.write();
            let inserted = state.bulk_insert(players);
            (inserted, state.len())
        };

        let metrics = Metrics::global();
        metrics.store.players_inserted.inc_by(inserted as u64);
        metrics.store.population.set(total as i64);
        log_debug!(offered, inserted, total, "bulk insert applied");
        inserted
    }

    /// Add one player unless the name is taken
    ///
    /// A taken name is a no-op returning false; the existing record wins.
    pub fn insert(&self, player: Player) -> bool {
        let (inserted, total) = {
            let mut state = self.state.write();
            let inserted = state.insert(player);
            (inserted, state.len())
        };

        if inserted {
            let metrics = Metrics::global();
            metrics.store.players_inserted.inc();
            metrics.store.population.set(total as i64);
        }
        inserted
    }

    /// Set a player's score. Returns false when the name is unknown.
    pub fn update_score(&self, name: &str, score: Score) -> bool {
        let updated = self.state.write().update_score(name, score);

        let metrics = Metrics::global();
        if updated {
            metrics.store.score_updates.inc();
        } else {
            metrics.store.score_updates_missed.inc();
        }
        updated
    }

    // ---------- reads ----------

    /// A page of the global ranking plus the total player count
    pub fn page(&self, limit: usize, offset: usize) -> Page {
        self.read_fresh(Requirements::PAGE).page(limit, offset)
    }

    /// Case-insensitive prefix search with substring fallback
    pub fn search(&self, query: &str, limit: usize) -> Vec<RankedEntry> {
        if query.is_empty() {
            return Vec::new();
        }
        self.read_fresh(Requirements::SEARCH).search(query, limit)
    }

    /// One player's rank by exact name
    pub fn rank_of(&self, name: &str) -> Option<RankedEntry> {
        self.read_fresh(Requirements::LOOKUP).rank_of(name)
    }

    /// Player count and score range
    pub fn stats(&self) -> Stats {
        self.state.read().stats()
    }

    /// Player at `index mod count` in the current, possibly unsorted, order
    pub fn pick(&self, index: usize) -> Option<Player> {
        self.state.read().pick(index)
    }

    /// Number of players
    pub fn total_count(&self) -> usize {
        self.state.read().len()
    }

    // ---------- derived structures ----------

    /// Bring every derived structure up to date
    pub fn refresh(&self) -> RefreshOutcome {
        let mut state = self.state.write();
        self.rebuild(&mut state, Requirements::ALL)
    }

    /// Freshness of every derived structure
    pub fn index_states(&self) -> IndexStates {
        self.state.read().index_states()
    }

    /// Rank table contents, rank 1 first. Does not refresh.
    pub fn rank_table(&self) -> Vec<(Score, Rank)> {
        self.state.read().rank_table_entries()
    }

    /// Rebuild counts since creation
    pub fn rebuild_stats(&self) -> RebuildStats {
        RebuildStats {
            rank_table: self.rebuilds.rank_table.load(Ordering::Relaxed),
            order: self.rebuilds.order.load(Ordering::Relaxed),
            prefix_index: self.rebuilds.prefix_index.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.state.read())
    }

    /// Shared guard over a state whose required structures are fresh
    fn read_fresh(&self, required: Requirements) -> RwLockReadGuard<'_, StoreState> {
        let state = self.state.read();
        if !state.needs_refresh(required) {
            return state;
        }
        drop(state);

        let mut state = self.state.write();
        self.rebuild(&mut state, required);
        RwLockWriteGuard::downgrade(state)
    }

    fn rebuild(&self, state: &mut StoreState, required: Requirements) -> RefreshOutcome {
        let started = Instant::now();
        let outcome = state.refresh(required);
        if !outcome.any() {
            return outcome;
        }

        let elapsed = started.elapsed();
        let metrics = Metrics::global();
        metrics.store.rebuild_duration.observe(elapsed.as_secs_f64());
        if outcome.rank_table {
            self.rebuilds.rank_table.fetch_add(1, Ordering::Relaxed);
            metrics.store.rank_table_rebuilds.inc();
        }
        if outcome.order {
            self.rebuilds.order.fetch_add(1, Ordering::Relaxed);
            metrics.store.reorders.inc();
        }
        if outcome.prefix_index {
            self.rebuilds.prefix_index.fetch_add(1, Ordering::Relaxed);
            metrics.store.prefix_index_rebuilds.inc();
        }

        log_debug!(
            rank_table = outcome.rank_table,
            order = outcome.order,
            prefix_index = outcome.prefix_index,
            players = state.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "derived indexes rebuilt"
        );
        outcome
    }
}
