//! Connection settings
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! port = "/dev/ttyACM0"
//! baud_rate = 230400
//! reset_on_connect = true
//! reset_settle_ms = 1000
//! reply_timeout_ms = 500
//! analog_reference_volts = 3.3
//! ```
//!
//! Only `port` is required.

use std::fs;
use std::path::Path;
use std::time::Duration;

use ioboard_hal::uart::{UartConfig, DEFAULT_BAUDRATE};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default settle time after a Reset before the board is usable
pub const DEFAULT_RESET_SETTLE_MS: u64 = 1000;

/// Default analog reference voltage
pub const DEFAULT_ANALOG_REFERENCE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Serial device path or name
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Issue a Reset and wait `reset_settle_ms` when connecting
    #[serde(default = "default_reset_on_connect")]
    pub reset_on_connect: bool,
    #[serde(default = "default_reset_settle_ms")]
    pub reset_settle_ms: u64,
    /// Give up on a reply after this long; wait forever when unset
    #[serde(default)]
    pub reply_timeout_ms: Option<u64>,
    /// Voltage that a full-scale analog reading corresponds to
    #[serde(default = "default_analog_reference")]
    pub analog_reference_volts: f32,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUDRATE
}

fn default_reset_on_connect() -> bool {
    true
}

fn default_reset_settle_ms() -> u64 {
    DEFAULT_RESET_SETTLE_MS
}

fn default_analog_reference() -> f32 {
    DEFAULT_ANALOG_REFERENCE
}

impl HostConfig {
    /// Defaults for everything but the port
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: default_baud_rate(),
            reset_on_connect: default_reset_on_connect(),
            reset_settle_ms: default_reset_settle_ms(),
            reply_timeout_ms: None,
            analog_reference_volts: default_analog_reference(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject settings no board can work with
    pub fn validate(&self) -> Result<()> {
        if self.port.is_empty() {
            return Err(Error::Config("port must not be empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(Error::Config("baud_rate must be positive".into()));
        }
        let volts = self.analog_reference_volts;
        if volts.is_nan() || volts <= 0.0 {
            return Err(Error::Config(
                "analog_reference_volts must be positive".into(),
            ));
        }
        if self.reply_timeout_ms == Some(0) {
            return Err(Error::Config("reply_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// 8N1 line settings at the configured rate
    pub fn uart(&self) -> UartConfig {
        UartConfig::with_baudrate(self.baud_rate)
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = HostConfig::from_toml_str(r#"port = "/dev/ttyUSB0""#).unwrap();
        assert_eq!(config, HostConfig::new("/dev/ttyUSB0"));
        assert_eq!(config.uart().baudrate, 230_400);
        assert_eq!(config.reset_settle(), Duration::from_secs(1));
        assert_eq!(config.reply_timeout(), None);
    }

    #[test]
    fn test_full_config() {
        let config = HostConfig::from_toml_str(
            r#"
            port = "COM4"
            baud_rate = 115200
            reset_on_connect = false
            reset_settle_ms = 250
            reply_timeout_ms = 500
            analog_reference_volts = 3.3
            "#,
        )
        .unwrap();

        assert_eq!(config.port, "COM4");
        assert_eq!(config.baud_rate, 115_200);
        assert!(!config.reset_on_connect);
        assert_eq!(config.reset_settle(), Duration::from_millis(250));
        assert_eq!(config.reply_timeout(), Some(Duration::from_millis(500)));
        assert!((config.analog_reference_volts - 3.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_port_rejected() {
        let err = HostConfig::from_toml_str("baud_rate = 9600").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = HostConfig::from_toml_str("port = \"x\"\nparity = \"odd\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for text in [
            "port = \"\"",
            "port = \"x\"\nbaud_rate = 0",
            "port = \"x\"\nanalog_reference_volts = -1.0",
            "port = \"x\"\nreply_timeout_ms = 0",
        ] {
            assert!(HostConfig::from_toml_str(text).is_err(), "{text}");
        }
    }
}
