//! Background score mutation
//!
//! A tokio task ticks at a fixed rate and nudges one random player's score per
//! tick. Higher scores are more likely to drop, which keeps the population from
//! piling up at the ceiling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::error::{Error, Result};
use crate::core::types::{clamp_score, Score, MAX_SCORE};
use crate::storage::ScoreSink;
use crate::{log_debug, log_info};

/// Smallest tick period; keeps very high rates from asking for a zero interval
const MIN_TICK: Duration = Duration::from_micros(1);

/// Drives random score updates into a [`ScoreSink`]
pub struct ScoreDriver<S: ScoreSink> {
    sink: Arc<S>,
    seed: Option<u64>,
    stop_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    updates_applied: Arc<AtomicU64>,
}

impl<S: ScoreSink> ScoreDriver<S> {
    /// Create a stopped driver over `sink`
    pub fn new(sink: Arc<S>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            sink,
            seed: None,
            stop_tx,
            handle: Mutex::new(None),
            updates_applied: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Use a fixed RNG seed for the update task
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start issuing `updates_per_second` updates
    ///
    /// Does nothing if the driver is already running. Must be called from
    /// within a tokio runtime.
    pub fn start(&self, updates_per_second: u32) -> Result<()> {
        if updates_per_second == 0 {
            return Err(Error::invalid_input("updates_per_second must be greater than 0"));
        }

        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        self.stop_tx.send_replace(false);
        let mut stop_rx = self.stop_tx.subscribe();
        let sink = Arc::clone(&self.sink);
        let applied = Arc::clone(&self.updates_applied);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let period = (Duration::from_secs(1) / updates_per_second).max(MIN_TICK);

        *handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if perform_update(sink.as_ref(), &mut rng) {
                            applied.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            log_debug!("score driver task exited");
        }));

        log_info!(updates_per_second, "score driver started");
        Ok(())
    }

    /// Signal the task to stop. Returns immediately.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Stop and wait for the task to finish
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        log_info!(updates = self.updates_applied(), "score driver stopped");
    }

    /// Whether the update task is live
    pub fn is_running(&self) -> bool {
        !*self.stop_tx.borrow() && self.handle.lock().as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Updates that hit a known player since creation
    pub fn updates_applied(&self) -> u64 {
        self.updates_applied.load(Ordering::Relaxed)
    }
}

/// One tick: pick a random player and move their score
///
/// Returns false when the population is empty or the update missed.
pub fn perform_update<S, R>(sink: &S, rng: &mut R) -> bool
where
    S: ScoreSink + ?Sized,
    R: Rng + ?Sized,
{
    let total = sink.total_count();
    if total == 0 {
        return false;
    }

    let index = rng.random_range(0..total);
    let Some(player) = sink.pick(index) else {
        return false;
    };
    let next = next_score(player.score, rng);
    sink.update_score(&player.name, next)
}

/// Next score for a player currently at `current`
///
/// With probability `current / 5000` the player loses 10 to 39 points,
/// otherwise the score moves by -5 to +19. The result is clamped.
pub fn next_score<R: Rng + ?Sized>(current: Score, rng: &mut R) -> Score {
    let loss_chance = f64::from(current) / f64::from(MAX_SCORE);
    let change: i64 = if rng.random::<f64>() < loss_chance {
        -rng.random_range(10..=39)
    } else {
        rng.random_range(-5..=19)
    };
    clamp_score(i64::from(current) + change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Player, MIN_SCORE};
    use crate::storage::RankedStore;

    #[derive(Default)]
    struct VecSink {
        players: Mutex<Vec<Player>>,
    }

    impl ScoreSink for VecSink {
        fn total_count(&self) -> usize {
            self.players.lock().len()
        }

        fn pick(&self, index: usize) -> Option<Player> {
            let players = self.players.lock();
            if players.is_empty() {
                return None;
            }
            Some(players[index % players.len()].clone())
        }

        fn update_score(&self, name: &str, score: Score) -> bool {
            let mut players = self.players.lock();
            match players.iter_mut().find(|p| p.name == name) {
                Some(player) => {
                    player.score = score;
                    true
                }
                None => false,
            }
        }
    }

    #[test]
    fn next_score_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(1);
        for current in [100, 101, 2500, 4990, 5000] {
            for _ in 0..500 {
                let next = next_score(current, &mut rng);
                assert!((MIN_SCORE..=MAX_SCORE).contains(&next));
                assert!(next + 39 >= current, "{} -> {}", current, next);
                assert!(next <= current + 19, "{} -> {}", current, next);
            }
        }
    }

    #[test]
    fn top_score_always_loses() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let next = next_score(MAX_SCORE, &mut rng);
            assert!((MAX_SCORE - 39..=MAX_SCORE - 10).contains(&next));
        }
    }

    #[test]
    fn update_on_empty_sink_is_skipped() {
        let sink = VecSink::default();
        assert!(!perform_update(&sink, &mut StdRng::seed_from_u64(3)));
    }

    #[test]
    fn update_moves_one_player() {
        let sink = VecSink::default();
        sink.players.lock().extend([
            Player::new("1", "amy", 5000),
            Player::new("2", "ben", 5000),
        ]);

        assert!(perform_update(&sink, &mut StdRng::seed_from_u64(4)));
        let moved = sink.players.lock().iter().filter(|p| p.score != 5000).count();
        assert_eq!(moved, 1);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let driver = ScoreDriver::new(Arc::new(VecSink::default()));
        assert!(driver.start(0).is_err());
    }

    #[tokio::test]
    async fn driver_updates_until_shutdown() {
        let store = Arc::new(RankedStore::new());
        store.bulk_insert(vec![Player::new("1", "amy", 2000), Player::new("2", "ben", 3000)]);

        let driver = ScoreDriver::new(Arc::clone(&store)).with_seed(5);
        driver.start(500).unwrap();
        driver.start(500).unwrap();
        assert!(driver.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        driver.shutdown().await;
        assert!(!driver.is_running());

        let applied = driver.updates_applied();
        assert!(applied > 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(driver.updates_applied(), applied);
    }

    #[tokio::test]
    async fn driver_restarts_after_stop() {
        let sink = Arc::new(VecSink::default());
        sink.players.lock().push(Player::new("1", "amy", 2000));

        let driver = ScoreDriver::new(sink).with_seed(6);
        driver.start(200).unwrap();
        driver.shutdown().await;
        driver.start(200).unwrap();
        assert!(driver.is_running());
        driver.shutdown().await;
    }
}
