//! Dense rank table
//!
//! Maps every distinct score to its 1-based dense rank: the highest score gets
//! rank 1, the next distinct score rank 2, and so on without gaps.

use std::collections::HashMap;

use crate::core::types::{Rank, Score};

/// Score to dense rank mapping, tagged with the generation it was built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankTable {
    ranks: HashMap<Score, Rank>,
    generation: u64,
}

impl RankTable {
    /// Build a table from the scores currently present
    ///
    /// Duplicates and ordering of the input do not matter.
    pub fn build<I>(scores: I, generation: u64) -> Self
    where
        I: IntoIterator<Item = Score>,
    {
        let mut distinct: Vec<Score> = scores.into_iter().collect();
        distinct.sort_unstable_by(|a, b| b.cmp(a));
        distinct.dedup();

        let ranks = distinct
            .into_iter()
            .zip(1..)
            .collect();

        Self { ranks, generation }
    }

    /// Dense rank of a score, if the score is present
    pub fn rank(&self, score: Score) -> Option<Rank> {
        self.ranks.get(&score).copied()
    }

    /// Generation of the score groups this table reflects
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of distinct scores
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether the table holds no scores
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// `(score, rank)` pairs ordered from rank 1 downwards
    pub fn entries(&self) -> Vec<(Score, Rank)> {
        let mut entries: Vec<(Score, Rank)> = self.ranks.iter().map(|(&s, &r)| (s, r)).collect();
        entries.sort_unstable_by_key(|&(_, rank)| rank);
        entries
    }
}
