//! Configuration management for the leaderboard service
//!
//! Settings come from a TOML file, then `LB_*` environment variables, then
//! command line flags (applied by the binary). Every section has defaults so
//! partial files are accepted.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "leaderboard.toml";

/// Maximum worker threads allowed
pub const MAX_WORKER_THREADS: usize = 1024;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Initial population
    pub population: PopulationConfig,

    /// Background score mutation
    pub simulation: SimulationConfig,

    /// Live snapshot streaming
    pub live: LiveConfig,

    /// Metrics and monitoring
    pub metrics: MetricsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Performance tuning
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,

    /// Page size used when a request gives no valid limit
    pub default_page_limit: usize,

    /// Largest page or search size a request may ask for
    pub max_page_limit: usize,
}

/// Population configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of players generated at startup
    pub size: usize,

    /// Fixed RNG seed for reproducible populations
    pub seed: Option<u64>,
}

/// Score mutation driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Run the driver at all
    pub enabled: bool,

    /// Score updates issued per second
    pub updates_per_second: u32,
}

/// Live update configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Interval between snapshots pushed to each subscriber
    #[serde(with = "duration_str")]
    pub push_interval: Duration,

    /// Page or search size used when a subscriber gives none
    pub snapshot_limit: usize,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics
    pub enable_prometheus: bool,

    /// Metrics server bind address
    pub metrics_addr: SocketAddr,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

/// Performance tuning configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto-detect)
    pub worker_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            default_page_limit: 50,
            max_page_limit: 100,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 10_000,
            seed: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            updates_per_second: 1500,
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            push_interval: Duration::from_millis(500),
            snapshot_limit: 50,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enable_prometheus: false,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or the default file when present,
    /// then apply environment overrides
    ///
    /// Not validated: callers layer CLI overrides first and call `validate` once.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Config::default(),
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file {:?}: {}", path, e)))?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LB_HTTP_ADDR") {
            self.server.http_addr = addr.parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Some(size) = lookup("LB_POPULATION_SIZE") {
            self.population.size = size.parse()
                .map_err(|e| Error::config(format!("Invalid population size: {}", e)))?;
        }

        if let Some(rate) = lookup("LB_UPDATES_PER_SECOND") {
            self.simulation.updates_per_second = rate.parse()
                .map_err(|e| Error::config(format!("Invalid update rate: {}", e)))?;
        }

        if let Some(interval) = lookup("LB_PUSH_INTERVAL") {
            self.live.push_interval = parse_duration(&interval)
                .map_err(|e| Error::config(format!("Invalid push interval: {}", e)))?;
        }

        if let Some(workers) = lookup("LB_WORKER_THREADS") {
            self.performance.worker_threads = workers.parse()
                .map_err(|e| Error::config(format!("Invalid worker threads: {}", e)))?;
        }

        if let Some(level) = lookup("LB_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("LB_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.metrics.enable_prometheus
            && self.metrics.metrics_addr.port() != 0
            && self.metrics.metrics_addr.port() == self.server.http_addr.port()
        {
            return Err(Error::config("Port conflict detected between HTTP and metrics servers"));
        }

        if self.server.max_page_limit == 0 {
            return Err(Error::config("max_page_limit must be at least 1"));
        }

        if self.server.default_page_limit == 0 || self.server.default_page_limit > self.server.max_page_limit {
            return Err(Error::config("default_page_limit must be within 1..=max_page_limit"));
        }

        if self.live.snapshot_limit == 0 || self.live.snapshot_limit > self.server.max_page_limit {
            return Err(Error::config("snapshot_limit must be within 1..=max_page_limit"));
        }

        if self.live.push_interval < Duration::from_millis(10) {
            return Err(Error::config("push_interval too small (minimum 10ms)"));
        }

        if self.simulation.enabled && self.simulation.updates_per_second == 0 {
            return Err(Error::config("updates_per_second must be positive when simulation is enabled"));
        }

        if self.performance.worker_threads > MAX_WORKER_THREADS {
            return Err(Error::config("Too many worker threads (maximum 1024)"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {},
            _ => return Err(Error::config("Invalid log level")),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {},
            _ => return Err(Error::config("Invalid log format (expected pretty or json)")),
        }

        Ok(())
    }

    /// Get optimal number of worker threads
    pub fn optimal_worker_threads(&self) -> usize {
        if self.performance.worker_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.performance.worker_threads
        }
    }
}

/// Serde adapter for durations written as `"500ms"`, `"2s"`, `"1m"` or `"1h"`
mod duration_str {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration string like '500ms' or '2s'")
            }

            fn visit_str<E>(self, value: &str) -> Result<Duration, E>
            where
                E: de::Error,
            {
                super::parse_duration(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DurationVisitor)
    }
}

// Bare numbers are seconds
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    let parse = |digits: &str| -> std::result::Result<u64, String> {
        digits.trim().parse().map_err(|_| format!("Invalid duration '{}'", s))
    };
    let scaled = |digits: &str, unit: u64| -> std::result::Result<u64, String> {
        parse(digits)?
            .checked_mul(unit)
            .ok_or_else(|| format!("Duration '{}' is out of range", s))
    };

    if let Some(ms) = s.strip_suffix("ms") {
        Ok(Duration::from_millis(parse(ms)?))
    } else if let Some(secs) = s.strip_suffix('s') {
        Ok(Duration::from_secs(parse(secs)?))
    } else if let Some(mins) = s.strip_suffix('m') {
        Ok(Duration::from_secs(scaled(mins, 60)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        Ok(Duration::from_secs(scaled(hours, 3600)?))
    } else {
        Ok(Duration::from_secs(parse(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.server.http_addr.port(), 8080);
        assert_eq!(config.server.default_page_limit, 50);
        assert_eq!(config.server.max_page_limit, 100);
        assert_eq!(config.population.size, 10_000);
        assert_eq!(config.simulation.updates_per_second, 1500);
        assert_eq!(config.live.push_interval, Duration::from_millis(500));
    }

    #[test]
    fn parses_partial_toml() {
        let config = Config::from_toml(
            r#"
            [server]
            http_addr = "127.0.0.1:3000"

            [live]
            push_interval = "250ms"

            [population]
            size = 42
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.server.http_addr.port(), 3000);
        assert_eq!(config.server.max_page_limit, 100);
        assert_eq!(config.live.push_interval, Duration::from_millis(250));
        assert_eq!(config.population.size, 42);
        assert_eq!(config.population.seed, Some(7));
        assert!(config.simulation.enabled);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nupdates_per_second = 10\n\n[logging]\nformat = \"json\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.simulation.updates_per_second, 10);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn load_leaves_validation_to_the_caller() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nupdates_per_second = 0").unwrap();
        let path = file.path().to_str().unwrap();

        let mut config = Config::load(Some(path)).unwrap();
        assert_eq!(config.simulation.updates_per_second, 0);
        assert!(config.validate().is_err());

        config.simulation.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("LB_HTTP_ADDR", "127.0.0.1:9999"),
            ("LB_POPULATION_SIZE", "500"),
            ("LB_PUSH_INTERVAL", "2s"),
            ("LB_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.http_addr.port(), 9999);
        assert_eq!(config.population.size, 500);
        assert_eq!(config.live.push_interval, Duration::from_secs(2));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn bad_env_override_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "LB_POPULATION_SIZE").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.server.default_page_limit = 500;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.updates_per_second = 0;
        assert!(config.validate().is_err());
        config.simulation.enabled = false;
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.metrics.enable_prometheus = true;
        config.metrics.metrics_addr = config.server.http_addr;
        assert!(config.validate().is_err());
    }

    #[test]
    fn duration_formats() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("15").unwrap(), Duration::from_secs(15));
        assert!(parse_duration("9999999999999999999h").is_err());
        assert!(parse_duration("999999999999999999m").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.live.push_interval, config.live.push_interval);
        assert_eq!(parsed.server.http_addr, config.server.http_addr);
    }
}
