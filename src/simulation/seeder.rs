//! Synthetic population generator
//!
//! Names are a first name plus a suffix. A second draw of an existing name gets
//! a random numeric tail; if that also collides the draw is discarded.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::PopulationConfig;
use crate::core::types::{Player, Score, MAX_SCORE, MIN_SCORE};
use crate::log_warn;

const FIRST_NAMES: [&str; 100] = [
    "rahul", "amit", "priya", "neha", "vijay", "sanjay", "deepak", "ankit", "rohit", "suresh",
    "arun", "kiran", "manoj", "pooja", "ravi", "ashok", "vivek", "sunita", "rajesh", "meena",
    "gaurav", "nisha", "sachin", "anjali", "vikram", "kavita", "nikhil", "swati", "akash", "geeta",
    "harsh", "divya", "mohit", "rekha", "varun", "shikha", "kunal", "mamta", "tarun", "seema",
    "alex", "john", "mike", "sarah", "emma", "james", "david", "lisa", "anna", "chris",
    "jason", "kevin", "brian", "steven", "mark", "paul", "daniel", "andrew", "joshua", "ryan",
    "arjun", "krishna", "shiva", "ganesh", "lakshmi", "durga", "parvati", "saraswati", "vishnu", "brahma",
    "alpha", "beta", "gamma", "delta", "epsilon", "omega", "sigma", "theta", "zeta", "kappa",
    "neo", "max", "sam", "leo", "kai", "raj", "jai", "dev", "nav", "sri",
    "titan", "phoenix", "dragon", "ninja", "cyber", "tech", "code", "byte", "pixel", "quantum",
];

const SUFFIXES: [&str; 40] = [
    "", "_kumar", "_sharma", "_singh", "_verma", "_gupta", "_patel", "_joshi", "_mehta", "_reddy",
    "_123", "_456", "_789", "_007", "_pro", "_dev", "_ace", "_star", "_king", "_queen",
    "_x", "_z", "_99", "_01", "_22", "_gamer", "_coder", "_hacker", "_ninja", "_wizard",
    "_burman", "_mathur", "_yadav", "_chauhan", "_malhotra", "_kapoor", "_saxena", "_bansal", "_mittal", "_agarwal",
];

/// Scores forced onto the head of a tied population
pub const TIE_SCORES: [Score; 5] = [4600, 3900, 2500, 1500, 1000];

/// How many leading players `generate_with_ties` considers
pub const TIE_WINDOW: usize = 50;

/// Draws per requested player before giving up
const MAX_ATTEMPTS_PER_PLAYER: usize = 100;

/// Generate `count` players with unique names and uniform scores
///
/// Ids are `user_1`, `user_2`, ... in generation order. May return fewer than
/// `count` players if the name space is exhausted.
pub fn generate_players<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Player> {
    let mut players = Vec::with_capacity(count);
    let mut used: HashSet<String> = HashSet::with_capacity(count);
    let max_attempts = count.saturating_mul(MAX_ATTEMPTS_PER_PLAYER);
    let mut attempts = 0;

    while players.len() < count && attempts < max_attempts {
        attempts += 1;

        let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
        let suffix = SUFFIXES[rng.random_range(0..SUFFIXES.len())];
        let mut name = format!("{}{}", first, suffix);
        if used.contains(&name) {
            name = format!("{}{}_{}", first, suffix, rng.random_range(0..10_000));
        }
        if used.contains(&name) {
            continue;
        }

        let score = rng.random_range(MIN_SCORE..=MAX_SCORE);
        used.insert(name.clone());
        players.push(Player::new(format!("user_{}", players.len() + 1), name, score));
    }

    if players.len() < count {
        log_warn!(requested = count, generated = players.len(), "name space exhausted");
    }
    players
}

/// Generate players, then force score ties at the top of the list
///
/// Within the first 50 players, those with `i % 10 < 5` take the score
/// `TIE_SCORES[i % 5]`.
pub fn generate_with_ties<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Player> {
    let mut players = generate_players(count, rng);
    for (i, player) in players.iter_mut().enumerate().take(TIE_WINDOW) {
        if i % 10 < 5 {
            player.score = TIE_SCORES[i % 5];
        }
    }
    players
}

/// Startup population from configuration
///
/// A configured seed makes the population reproducible.
pub fn generate_population(config: &PopulationConfig) -> Vec<Player> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    generate_with_ties(config.size, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn names_are_unique_and_scores_in_range() {
        let players = generate_players(5_000, &mut rng());
        assert_eq!(players.len(), 5_000);

        let names: HashSet<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), players.len());
        assert!(players.iter().all(|p| (MIN_SCORE..=MAX_SCORE).contains(&p.score)));
    }

    #[test]
    fn ids_follow_generation_order() {
        let players = generate_players(3, &mut rng());
        let ids: Vec<&str> = players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["user_1", "user_2", "user_3"]);
    }

    #[test]
    fn collisions_get_numeric_tail() {
        // 4000 base names, so a larger population must use tails
        let base: HashSet<String> = FIRST_NAMES
            .iter()
            .flat_map(|f| SUFFIXES.iter().map(move |s| format!("{}{}", f, s)))
            .collect();

        let players = generate_players(6_000, &mut rng());
        let tailed: Vec<&Player> = players.iter().filter(|p| !base.contains(&p.name)).collect();
        assert!(!tailed.is_empty());
        for player in tailed {
            let (head, tail) = player.name.rsplit_once('_').unwrap();
            assert!(base.contains(head), "{}", player.name);
            assert!(tail.parse::<u32>().unwrap() < 10_000);
        }
    }

    #[test]
    fn ties_cover_the_head() {
        let players = generate_with_ties(100, &mut rng());
        for (i, player) in players.iter().enumerate().take(TIE_WINDOW) {
            if i % 10 < 5 {
                assert_eq!(player.score, TIE_SCORES[i % 5], "player {}", i);
            }
        }
        let forced = players.iter().take(TIE_WINDOW).filter(|p| p.score == 4600).count();
        assert!(forced >= 5);
    }

    #[test]
    fn ties_on_short_population() {
        let players = generate_with_ties(3, &mut rng());
        let scores: Vec<Score> = players.iter().map(|p| p.score).collect();
        assert_eq!(scores, [4600, 3900, 2500]);
    }

    #[test]
    fn seeded_population_is_reproducible() {
        let config = PopulationConfig { size: 200, seed: Some(7) };
        assert_eq!(generate_population(&config), generate_population(&config));
    }

    #[test]
    fn empty_population() {
        assert!(generate_players(0, &mut rng()).is_empty());
    }
}
