//! Engine configuration
//!
//! Configuration is organized into logical sections:
//! - Connection settings (baud rate, read timeout)
//! - Polling settings (inbound poll cadence, engine tick, calibration read-back)
//! - Event settings (bus history and channel sizes)
//!
//! Every field has a default, so a partial TOML document is valid.

use crate::error::{ConfigError, SettingsError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use steplink_communication::{ConnectionParams, SessionConfig};
use steplink_core::EventBusConfig;

/// Baud rates accepted by [`Config::validate`]
pub const STANDARD_BAUD_RATES: [u32; 8] =
    [9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 460_800, 921_600];

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Baud rate for serial connections
    pub baud_rate: u32,
    /// Upper bound on one read attempt in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            read_timeout_ms: 100,
        }
    }
}

/// Timer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Inbound poll cadence in milliseconds
    pub poll_interval_ms: u64,
    /// Period of the engine tick loop in milliseconds
    pub tick_ms: u64,
    /// Delay between `R` and the follow-up `G` in milliseconds
    pub calibration_followup_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            tick_ms: 10,
            calibration_followup_ms: 1,
        }
    }
}

/// Event bus settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Number of past events kept (0 disables history)
    pub history_size: usize,
    /// Capacity of the async broadcast channel
    pub channel_capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            history_size: 256,
            channel_capacity: 1024,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Timer settings
    pub polling: PollingSettings,
    /// Event bus settings
    pub events: EventSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !STANDARD_BAUD_RATES.contains(&self.connection.baud_rate) {
            return Err(ConfigError::UnsupportedBaudRate(self.connection.baud_rate));
        }

        let durations = [
            ("connection.read_timeout_ms", self.connection.read_timeout_ms),
            ("polling.poll_interval_ms", self.polling.poll_interval_ms),
            ("polling.tick_ms", self.polling.tick_ms),
            (
                "polling.calibration_followup_ms",
                self.polling.calibration_followup_ms,
            ),
        ];
        for (key, value) in durations {
            if value == 0 {
                return Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "events.channel_capacity".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Parameters for opening the port
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            baud_rate: self.connection.baud_rate,
            read_timeout: Duration::from_millis(self.connection.read_timeout_ms),
        }
    }

    /// Session tuning derived from this config
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            connection: self.connection_params(),
            poll_interval: Duration::from_millis(self.polling.poll_interval_ms),
            calibration_followup: Duration::from_millis(self.polling.calibration_followup_ms),
            events: EventBusConfig {
                channel_capacity: self.events.channel_capacity,
                enable_history: self.events.history_size > 0,
                max_history_size: self.events.history_size,
            },
        }
    }

    /// Period of the host's tick loop
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.polling.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wire_requirements() {
        let config = Config::new();
        assert!(config.validate().is_ok());

        let params = config.connection_params();
        assert_eq!(params.baud_rate, 115_200);
        assert_eq!(params.read_timeout, Duration::from_millis(100));
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = Config::new();
        config.polling.poll_interval_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange {
                key: "polling.poll_interval_ms".to_string(),
                value: "0".to_string(),
            })
        );
    }

    #[test]
    fn test_history_disabled_by_zero_size() {
        let mut config = Config::new();
        config.events.history_size = 0;
        let session = config.session_config();
        assert!(!session.events.enable_history);
        assert_eq!(session.poll_interval, Duration::from_millis(100));
    }
}
