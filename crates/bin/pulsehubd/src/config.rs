//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `pulsehub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use pulsehub_adapter_automate::AutomateConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Event bus settings.
    pub event_bus: EventBusConfig,
    /// Automate Pulse Hub integration.
    pub automate: AutomateConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Events a slow subscriber may lag behind before missing some.
    pub capacity: usize,
}

impl Config {
    /// Load configuration from `pulsehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("pulsehub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("PULSEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(capacity) = var("PULSEHUB_EVENT_CAPACITY").and_then(|v| v.parse().ok()) {
            self.event_bus.capacity = capacity;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.event_bus.capacity == 0 {
            return Err(ConfigError::Validation(
                "event bus capacity must be non-zero".to_string(),
            ));
        }
        if self.automate.signal_capacity == 0 {
            return Err(ConfigError::Validation(
                "automate signal capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pulsehubd=info,pulsehub_adapter_automate=info,pulsehub_app=info".to_string(),
        }
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.event_bus.capacity, 256);
        assert!(config.logging.filter.contains("pulsehubd=info"));
        assert!(config.automate.enabled);
        assert!(config.automate.rollers.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.event_bus.capacity, 256);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [logging]
            filter = 'debug'

            [event_bus]
            capacity = 32

            [automate]
            enabled = false
            title = 'Upstairs'
            signal_capacity = 4
            travel_millis = 2000

            [[automate.rollers]]
            id = 'ABC'
            name = 'Lounge'
            closed_percent = 100
            battery_percent = 90
            battery = 4.1
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.event_bus.capacity, 32);
        assert!(!config.automate.enabled);
        assert_eq!(config.automate.title, "Upstairs");
        assert_eq!(config.automate.signal_capacity, 4);
        assert_eq!(config.automate.travel_millis, 2000);
        assert_eq!(config.automate.rollers.len(), 1);
        assert_eq!(config.automate.rollers[0].battery_percent, Some(90));
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.event_bus.capacity, 256);
    }

    #[test]
    fn should_prefer_rust_log_over_pulsehub_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("PULSEHUB_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");

        let mut config = Config::default();
        config.apply_overrides(env(&[("PULSEHUB_LOG", "warn")]));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_override_event_capacity_from_env() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("PULSEHUB_EVENT_CAPACITY", "64")]));
        assert_eq!(config.event_bus.capacity, 64);
    }

    #[test]
    fn should_ignore_unparsable_capacity() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("PULSEHUB_EVENT_CAPACITY", "lots")]));
        assert_eq!(config.event_bus.capacity, 256);
    }

    #[test]
    fn should_reject_zero_capacities() {
        let mut config = Config::default();
        config.event_bus.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.automate.signal_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
