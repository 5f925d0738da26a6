//! Application factory
//!
//! Builds the store, seeds the startup population and wraps everything in an
//! [`AppState`].

use std::sync::Arc;
use std::time::Instant;

use crate::core::app_state::AppState;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::simulation::seeder;
use crate::storage::RankedStore;
use crate::log_info;

/// Create the application state from configuration
pub fn create_app_state(config: Config) -> Result<AppState> {
    config.validate()?;

    let started = Instant::now();
    let store = Arc::new(RankedStore::new());

    log_info!(size = config.population.size, seed = ?config.population.seed, "generating population");
    let players = seeder::generate_population(&config.population);
    let loaded = store.bulk_insert(players);
    store.refresh();

    log_info!(
        players = loaded,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "leaderboard loaded"
    );
    Ok(AppState::new(store, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::IndexState;

    #[test]
    fn seeds_and_refreshes() {
        let mut config = Config::default();
        config.population.size = 500;
        config.population.seed = Some(11);

        let state = create_app_state(config).unwrap();
        assert_eq!(state.store.total_count(), 500);

        let states = state.store.index_states();
        assert_eq!(states.rank_table, IndexState::Fresh);
        assert_eq!(states.prefix_index, IndexState::Fresh);

        let top = state.store.page(1, 0);
        assert_eq!(top.entries[0].rank, 1);
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = Config::default();
        config.server.max_page_limit = 0;
        assert!(create_app_state(config).is_err());
    }
}
