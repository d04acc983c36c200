//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Server and saga configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `EXCHANGE` — topic exchange name (default: `"commerce"`)
/// - `OUTBOX_POLL_MS` — outbox relay poll interval (default: `50`)
/// - `SWEEP_THRESHOLD_SECS` — how long an order may stay pending before the
///   sweep force-compensates it (default: `300`)
/// - `SWEEP_INTERVAL_SECS` — how often the sweep runs (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub exchange: String,
    pub outbox_poll_ms: u64,
    pub sweep_threshold_secs: i64,
    pub sweep_interval_secs: u64,
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parsed("PORT", 3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            exchange: std::env::var("EXCHANGE").unwrap_or_else(|_| "commerce".to_string()),
            outbox_poll_ms: env_parsed("OUTBOX_POLL_MS", 50),
            sweep_threshold_secs: env_parsed("SWEEP_THRESHOLD_SECS", 300),
            sweep_interval_secs: env_parsed("SWEEP_INTERVAL_SECS", 30),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the outbox relay poll interval.
    pub fn outbox_poll_interval(&self) -> Duration {
        Duration::from_millis(self.outbox_poll_ms)
    }

    /// Returns the pending-order threshold for the sweep.
    pub fn sweep_threshold(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.sweep_threshold_secs)
    }

    /// Returns the sweep run interval.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            exchange: "commerce".to_string(),
            outbox_poll_ms: 50,
            sweep_threshold_secs: 300,
            sweep_interval_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.exchange, "commerce");
        assert_eq!(config.outbox_poll_interval(), Duration::from_millis(50));
        assert_eq!(config.sweep_threshold(), chrono::Duration::minutes(5));
        assert_eq!(config.sweep_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
