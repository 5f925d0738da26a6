//! Metrics collection for the leaderboard service
//!
//! Prometheus counters, gauges and histograms registered into one process-wide
//! registry and exposed as text on the metrics listener.

use crate::core::Result;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Histogram, IntCounter,
    IntCounterVec, IntGauge, Registry, TextEncoder,
};

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Store mutation and rebuild metrics
pub struct StoreMetrics {
    /// Players added through insert or bulk insert
    pub players_inserted: IntCounter,
    /// Score updates applied to a known player
    pub score_updates: IntCounter,
    /// Score updates naming an unknown player
    pub score_updates_missed: IntCounter,
    /// Rank table rebuilds
    pub rank_table_rebuilds: IntCounter,
    /// Prefix index rebuilds
    pub prefix_index_rebuilds: IntCounter,
    /// Ordered view re-sorts triggered by reads
    pub reorders: IntCounter,
    /// Current number of players
    pub population: IntGauge,
    /// Time spent rebuilding derived structures, in seconds
    pub rebuild_duration: Histogram,
}

/// Read-side metrics
pub struct QueryMetrics {
    /// Requests served, labelled by query kind
    pub requests: IntCounterVec,
    /// Open live-update streams
    pub live_subscribers: IntGauge,
}

/// Centralized metrics for all components
pub struct Metrics {
    /// Store metrics
    pub store: StoreMetrics,
    /// Query metrics
    pub queries: QueryMetrics,
}

impl Metrics {
    /// Create and register every metric
    pub fn new() -> Result<Self> {
        Ok(Self {
            store: StoreMetrics::new(&REGISTRY)?,
            queries: QueryMetrics::new(&REGISTRY)?,
        })
    }

    /// Get the global metrics instance
    pub fn global() -> &'static Metrics {
        static INSTANCE: Lazy<Metrics> = Lazy::new(|| {
            Metrics::new().expect("Failed to initialize metrics")
        });
        &INSTANCE
    }
}

impl StoreMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        Ok(Self {
            players_inserted: register_int_counter_with_registry!(
                "lb_players_inserted_total",
                "Total number of players inserted",
                registry
            )?,
            score_updates: register_int_counter_with_registry!(
                "lb_score_updates_total",
                "Total number of score updates applied",
                registry
            )?,
            score_updates_missed: register_int_counter_with_registry!(
                "lb_score_updates_missed_total",
                "Total number of score updates for unknown players",
                registry
            )?,
            rank_table_rebuilds: register_int_counter_with_registry!(
                "lb_rank_table_rebuilds_total",
                "Total number of rank table rebuilds",
                registry
            )?,
            prefix_index_rebuilds: register_int_counter_with_registry!(
                "lb_prefix_index_rebuilds_total",
                "Total number of prefix index rebuilds",
                registry
            )?,
            reorders: register_int_counter_with_registry!(
                "lb_reorders_total",
                "Total number of ordered view re-sorts",
                registry
            )?,
            population: register_int_gauge_with_registry!(
                "lb_population",
                "Current number of players",
                registry
            )?,
            rebuild_duration: register_histogram_with_registry!(
                "lb_rebuild_duration_seconds",
                "Duration of derived structure rebuilds in seconds",
                vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5],
                registry
            )?,
        })
    }
}

impl QueryMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        Ok(Self {
            requests: register_int_counter_vec_with_registry!(
                "lb_requests_total",
                "Total number of read requests by kind",
                &["kind"],
                registry
            )?,
            live_subscribers: register_int_gauge_with_registry!(
                "lb_live_subscribers",
                "Number of open live-update streams",
                registry
            )?,
        })
    }
}

/// Force registration of every metric
///
/// Called once at startup so the first scrape lists all series.
pub fn init_registry() {
    let _ = Metrics::global();
}

/// The registry all metrics are registered into
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Gather all metrics in the Prometheus text exposition format
pub fn gather_text() -> Result<String> {
    let families = registry().gather();
    Ok(TextEncoder::new().encode_to_string(&families)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_metrics_are_exported() {
        init_registry();
        Metrics::global().queries.requests.with_label_values(&["page"]).inc();

        let text = gather_text().unwrap();
        assert!(text.contains("lb_population"));
        assert!(text.contains("lb_requests_total{kind=\"page\"}"));
    }
}
