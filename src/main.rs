//! Leaderboard Server
//!
//! Real-time ranked leaderboard with paging, name search, live streams and a
//! background score simulator.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use leaderboard::api::{start_metrics_server, start_server};
use leaderboard::core::{factory, Config};
use leaderboard::simulation::ScoreDriver;
use leaderboard::{log_error, log_info, log_warn};
use tokio::signal;
use tokio::sync::watch;

fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    // Load configuration
    let mut config = Config::load(matches.get_one::<String>("config").map(String::as_str))?;

    // Apply CLI overrides
    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    leaderboard::init(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.optimal_worker_threads())
        .thread_name("leaderboard-worker")
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(run(config))
}

fn build_cli() -> Command {
    Command::new("leaderboard")
        .version(leaderboard::VERSION)
        .about("Real-time ranked leaderboard server.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address")
        )
        .arg(
            Arg::new("population")
                .long("population")
                .value_name("N")
                .help("Number of players generated at startup")
        )
        .arg(
            Arg::new("updates-per-second")
                .long("updates-per-second")
                .value_name("N")
                .help("Simulated score updates per second")
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("N")
                .help("Number of worker threads")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("no-simulation")
                .long("no-simulation")
                .action(ArgAction::SetTrue)
                .help("Do not run the background score simulator")
        )
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) -> leaderboard::Result<()> {
    use leaderboard::Error;

    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr.parse()
            .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
    }

    if let Some(size) = matches.get_one::<String>("population") {
        config.population.size = size.parse()
            .map_err(|e| Error::config(format!("Invalid population size: {}", e)))?;
    }

    if let Some(rate) = matches.get_one::<String>("updates-per-second") {
        config.simulation.updates_per_second = rate.parse()
            .map_err(|e| Error::config(format!("Invalid update rate: {}", e)))?;
    }

    if let Some(workers) = matches.get_one::<String>("workers") {
        config.performance.worker_threads = workers.parse()
            .map_err(|e| Error::config(format!("Invalid worker count: {}", e)))?;
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    if matches.get_flag("no-simulation") {
        config.simulation.enabled = false;
    }

    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let state = factory::create_app_state(config)?;
    let config = Arc::clone(&state.config);

    let driver = ScoreDriver::new(Arc::clone(&state.store));
    if config.simulation.enabled {
        driver.start(config.simulation.updates_per_second)?;
    } else {
        log_info!("Score simulation disabled");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let metrics_handle = if config.metrics.enable_prometheus {
        let addr = config.metrics.metrics_addr;
        let stop = wait_for_stop(shutdown_rx.clone());
        Some(tokio::spawn(async move { start_metrics_server(addr, stop).await }))
    } else {
        None
    };

    let mut http_handle = tokio::spawn(start_server(state, wait_for_stop(shutdown_rx)));

    let early_exit = tokio::select! {
        _ = shutdown_signal() => None,
        result = &mut http_handle => Some(result),
    };

    if early_exit.is_none() {
        log_warn!("Received shutdown signal, initiating graceful shutdown...");
    }
    shutdown_tx.send_replace(true);
    driver.shutdown().await;

    if let Some(handle) = metrics_handle {
        match handle.await {
            Ok(Err(e)) => log_error!(error = %e, "metrics server failed"),
            Err(e) => log_error!(error = %e, "metrics server task panicked"),
            Ok(Ok(())) => {}
        }
    }

    let http_result = match early_exit {
        Some(result) => result,
        None => http_handle.await,
    };
    http_result.context("HTTP server task panicked")??;

    log_info!("Shutdown complete");
    Ok(())
}

/// Resolves once the shutdown flag flips
fn wait_for_stop(mut rx: watch::Receiver<bool>) -> impl Future<Output = ()> + Send + 'static {
    async move {
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

/// Setup graceful shutdown signal handling
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log_error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log_error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log_info!("Received terminate signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_apply_before_validation() {
        let mut config = Config::default();
        config.simulation.updates_per_second = 0;
        assert!(config.validate().is_err());

        let matches = build_cli()
            .try_get_matches_from(["leaderboard", "--no-simulation", "--population", "25"])
            .unwrap();
        apply_cli_overrides(&mut config, &matches).unwrap();

        assert!(!config.simulation.enabled);
        assert_eq!(config.population.size, 25);
        assert!(config.validate().is_ok());
    }
}
