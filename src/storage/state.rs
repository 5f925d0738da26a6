//! Store state - the single owned aggregate behind the store's lock
//!
//! Holds the authoritative player records plus every structure derived from
//! them. Writers update the primary map, ordered view and score groups eagerly
//! and bump generation counters. Derived structures remember the generation
//! they were built from, so staleness is a counter comparison.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::prefix_index::{self, PrefixIndex};
use super::rank_table::RankTable;
use crate::core::types::{Page, Player, Rank, RankedEntry, Score, Stats};

/// Position of a player in the record slab. Players are never removed, so a
/// slot stays valid for the life of the store.
pub type Slot = usize;

/// Freshness of a derived structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Reflects every write so far
    Fresh,
    /// A write happened since the last rebuild
    Stale,
}

impl IndexState {
    fn from_generations(built: u64, current: u64) -> Self {
        if built == current {
            IndexState::Fresh
        } else {
            IndexState::Stale
        }
    }
}

/// Freshness of all derived structures at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStates {
    /// Dense rank table
    pub rank_table: IndexState,
    /// Ordered view sort
    pub order: IndexState,
    /// Name prefix index
    pub prefix_index: IndexState,
}

/// Which derived structures a read depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    /// Needs the dense rank table
    pub ranks: bool,
    /// Needs the ordered view sorted
    pub order: bool,
    /// Needs the name prefix index
    pub prefixes: bool,
}

impl Requirements {
    /// Ranking page reads
    pub const PAGE: Self = Self { ranks: true, order: true, prefixes: false };
    /// Name search reads
    pub const SEARCH: Self = Self { ranks: true, order: false, prefixes: true };
    /// Single player rank lookups
    pub const LOOKUP: Self = Self { ranks: true, order: false, prefixes: false };
    /// Everything
    pub const ALL: Self = Self { ranks: true, order: true, prefixes: true };
}

/// What a refresh actually rebuilt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Rank table was rebuilt
    pub rank_table: bool,
    /// Ordered view was re-sorted
    pub order: bool,
    /// Prefix index was rebuilt
    pub prefix_index: bool,
}

impl RefreshOutcome {
    /// Whether anything was rebuilt
    pub fn any(&self) -> bool {
        self.rank_table || self.order || self.prefix_index
    }
}

/// Write counters. `scores` moves on every write that can change ranks or
/// order, `names` only when the name set grows.
#[derive(Debug, Clone, Copy, Default)]
struct Generations {
    scores: u64,
    names: u64,
}

/// The ranked store's data
#[derive(Debug, Default)]
pub struct StoreState {
    players: Vec<Player>,
    by_name: HashMap<String, Slot>,
    ordered: Vec<Slot>,
    score_groups: BTreeMap<Score, HashSet<Slot>>,
    rank_table: RankTable,
    prefix_index: PrefixIndex,
    sorted_generation: u64,
    generations: Generations,
}

impl StoreState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    // ---------- write path ----------

    /// Add one player, leaving the ordered view unsorted
    ///
    /// Returns false and changes nothing when the name is already present.
    pub fn insert(&mut self, player: Player) -> bool {
        if !self.push_player(player) {
            return false;
        }
        self.generations.scores += 1;
        self.generations.names += 1;
        true
    }

    /// Add a batch of players and sort the ordered view once at the end
    ///
    /// Returns how many players were actually added.
    pub fn bulk_insert(&mut self, players: Vec<Player>) -> usize {
        let mut inserted = 0;
        for player in players {
            if self.push_player(player) {
                inserted += 1;
            }
        }

        if inserted > 0 {
            self.generations.scores += 1;
            self.generations.names += 1;
            self.sort_ordered();
        }
        inserted
    }

    /// Move a player to a new score
    ///
    /// Returns false when the name is unknown. Never touches the prefix index.
    pub fn update_score(&mut self, name: &str, score: Score) -> bool {
        let Some(&slot) = self.by_name.get(name) else {
            return false;
        };

        let old = self.players[slot].score;
        if let Some(group) = self.score_groups.get_mut(&old) {
            group.remove(&slot);
            if group.is_empty() {
                self.score_groups.remove(&old);
            }
        }

        self.players[slot].score = score;
        self.score_groups.entry(score).or_default().insert(slot);
        self.generations.scores += 1;
        true
    }

    fn push_player(&mut self, player: Player) -> bool {
        if self.by_name.contains_key(&player.name) {
            return false;
        }

        let slot = self.players.len();
        self.by_name.insert(player.name.clone(), slot);
        self.score_groups.entry(player.score).or_default().insert(slot);
        self.ordered.push(slot);
        self.players.push(player);
        true
    }

    // ---------- derived structures ----------

    /// Current freshness of every derived structure
    pub fn index_states(&self) -> IndexStates {
        IndexStates {
            rank_table: IndexState::from_generations(self.rank_table.generation(), self.generations.scores),
            order: IndexState::from_generations(self.sorted_generation, self.generations.scores),
            prefix_index: IndexState::from_generations(self.prefix_index.generation(), self.generations.names),
        }
    }

    /// Whether any structure a read depends on is stale
    pub fn needs_refresh(&self, required: Requirements) -> bool {
        let states = self.index_states();
        (required.ranks && states.rank_table == IndexState::Stale)
            || (required.order && states.order == IndexState::Stale)
            || (required.prefixes && states.prefix_index == IndexState::Stale)
    }

    /// Rebuild whatever required structure is still stale
    ///
    /// Each rebuild re-checks its generation first, so calling this again with
    /// no intervening write does nothing.
    pub fn refresh(&mut self, required: Requirements) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();
        // Rank table and order move together so a page never mixes generations
        if required.ranks || required.order {
            outcome.rank_table = self.rebuild_rank_table();
            outcome.order = self.ensure_ordered();
        }
        if required.prefixes {
            outcome.prefix_index = self.rebuild_prefix_index();
        }
        outcome
    }

    fn rebuild_rank_table(&mut self) -> bool {
        if self.rank_table.generation() == self.generations.scores {
            return false;
        }
        self.rank_table = RankTable::build(self.score_groups.keys().copied(), self.generations.scores);
        true
    }

    fn rebuild_prefix_index(&mut self) -> bool {
        if self.prefix_index.generation() == self.generations.names {
            return false;
        }
        let names = self.players.iter().enumerate().map(|(slot, p)| (slot, p.name.as_str()));
        self.prefix_index = PrefixIndex::build(names, self.generations.names);
        true
    }

    fn ensure_ordered(&mut self) -> bool {
        if self.sorted_generation == self.generations.scores {
            return false;
        }
        self.sort_ordered();
        true
    }

    fn sort_ordered(&mut self) {
        let players = &self.players;
        self.ordered.sort_unstable_by(|&a, &b| ranking_order(&players[a], &players[b]));
        self.sorted_generation = self.generations.scores;
    }

    /// Rank table contents, rank 1 first
    pub fn rank_table_entries(&self) -> Vec<(Score, Rank)> {
        self.rank_table.entries()
    }

    // ---------- read path ----------

    /// Entries `[offset, offset + limit)` of the ordered view
    ///
    /// Expects rank table and order to be fresh.
    pub fn page(&self, limit: usize, offset: usize) -> Page {
        let total = self.ordered.len();
        let entries = if offset >= total {
            Vec::new()
        } else {
            let end = offset.saturating_add(limit).min(total);
            self.ordered[offset..end].iter().map(|&slot| self.entry(slot)).collect()
        };

        Page { entries, total }
    }

    /// Case-insensitive name search, best score first
    ///
    /// Ties keep candidate order; there is no name tie-break here. Expects rank
    /// table and prefix index to be fresh.
    pub fn search(&self, query: &str, limit: usize) -> Vec<RankedEntry> {
        let folded = prefix_index::fold(query);
        if folded.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut candidates = self.prefix_index.candidates(&folded);
        let players = &self.players;
        candidates.sort_by(|&a, &b| players[b].score.cmp(&players[a].score));

        candidates
            .into_iter()
            .take(limit)
            .map(|slot| self.entry(slot))
            .collect()
    }

    /// Rank of one player by exact name. Expects the rank table to be fresh.
    pub fn rank_of(&self, name: &str) -> Option<RankedEntry> {
        self.by_name.get(name).map(|&slot| self.entry(slot))
    }

    /// Population size and score range
    pub fn stats(&self) -> Stats {
        let min = self.score_groups.keys().next().copied().unwrap_or(0);
        let max = self.score_groups.keys().next_back().copied().unwrap_or(0);
        Stats {
            total: self.players.len(),
            min,
            max,
        }
    }

    /// Player at `index mod count` in the ordered view's current order
    pub fn pick(&self, index: usize) -> Option<Player> {
        if self.ordered.is_empty() {
            return None;
        }
        let slot = self.ordered[index % self.ordered.len()];
        Some(self.players[slot].clone())
    }

    /// Number of players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the store holds no players
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn entry(&self, slot: Slot) -> RankedEntry {
        let player = &self.players[slot];
        // A fresh table covers every present score
        let rank = self.rank_table.rank(player.score).unwrap_or_default();
        debug_assert!(rank > 0, "rank table missing score {}", player.score);
        RankedEntry::new(rank, player.name.as_str(), player.score)
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.players.len(), self.by_name.len());
        assert_eq!(self.players.len(), self.ordered.len());

        let unique: HashSet<Slot> = self.ordered.iter().copied().collect();
        assert_eq!(unique.len(), self.ordered.len(), "ordered view has duplicates");

        let mut grouped = 0;
        for (score, group) in &self.score_groups {
            assert!(!group.is_empty(), "empty score group {}", score);
            for &slot in group {
                assert_eq!(self.players[slot].score, *score);
            }
            grouped += group.len();
        }
        assert_eq!(grouped, self.players.len());

        if self.index_states().order == IndexState::Fresh {
            for pair in self.ordered.windows(2) {
                let (a, b) = (&self.players[pair[0]], &self.players[pair[1]]);
                assert_ne!(ranking_order(a, b), Ordering::Greater, "{:?} before {:?}", a, b);
            }
        }
    }
}

/// Ranking order: score descending, then name ascending
pub fn ranking_order(a: &Player, b: &Player) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name))
}
