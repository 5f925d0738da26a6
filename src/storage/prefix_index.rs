//! Case-folded name prefix index
//!
//! Every non-empty lowercase prefix of every name maps to the slots of the
//! players whose name starts with it. Lookups that are not a prefix of any name
//! fall back to scanning the keys for a substring match.

use std::collections::{HashMap, HashSet};

use super::state::Slot;

/// Lowercase each character on its own, independent of its position
///
/// Keeps every prefix of a folded name equal to the fold of the name's prefix.
pub fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Prefix to player slots, tagged with the name generation it was built from
#[derive(Debug, Clone, Default)]
pub struct PrefixIndex {
    prefixes: HashMap<String, Vec<Slot>>,
    generation: u64,
}

impl PrefixIndex {
    /// Build the index from `(slot, name)` pairs
    ///
    /// Slots under each prefix keep the order of the input.
    pub fn build<'a, I>(names: I, generation: u64) -> Self
    where
        I: IntoIterator<Item = (Slot, &'a str)>,
    {
        let mut prefixes: HashMap<String, Vec<Slot>> = HashMap::new();

        for (slot, name) in names {
            let folded = fold(name);
            // Prefixes end on char boundaries so multi-byte names stay valid
            let ends = folded
                .char_indices()
                .skip(1)
                .map(|(i, _)| i)
                .chain(std::iter::once(folded.len()));

            for end in ends {
                let prefix = &folded[..end];
                match prefixes.get_mut(prefix) {
                    Some(slots) => slots.push(slot),
                    None => {
                        prefixes.insert(prefix.to_string(), vec![slot]);
                    }
                }
            }
        }

        Self { prefixes, generation }
    }

    /// Candidate slots for an already case-folded query
    ///
    /// An exact prefix hit returns that prefix's slots. Otherwise every key
    /// containing the query contributes its slots, de-duplicated.
    pub fn candidates(&self, folded_query: &str) -> Vec<Slot> {
        if folded_query.is_empty() {
            return Vec::new();
        }

        if let Some(slots) = self.prefixes.get(folded_query) {
            return slots.clone();
        }

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for (prefix, slots) in &self.prefixes {
            if prefix.contains(folded_query) {
                for &slot in slots {
                    if seen.insert(slot) {
                        matches.push(slot);
                    }
                }
            }
        }
        matches
    }

    /// Whether a folded string is a key of the index
    pub fn contains_prefix(&self, folded: &str) -> bool {
        self.prefixes.contains_key(folded)
    }

    /// Generation of the name set this index reflects
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of distinct prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether the index holds no prefixes
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
