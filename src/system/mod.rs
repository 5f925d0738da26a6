//! System utilities and monitoring
//!
//! Prometheus metrics and uptime reporting.

pub mod metrics;

use std::time::{Duration, Instant};

/// Uptime rendered as `1h 23m 45s`, dropping leading zero units
pub fn format_uptime(started_at: Instant) -> String {
    format_duration(started_at.elapsed())
}

fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_format() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(5025)), "1h 23m 45s");
    }
}
