//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the tally bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Tally device identity and startup behavior.
    pub device: DeviceConfig,

    /// Tally command protocol settings.
    pub tally: TallyConfig,

    /// Connection timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
        }
    }
}

/// Which tally device implementation drives the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceBackend {
    /// The SDI shield over a Linux I2C adapter.
    #[default]
    I2c,
    /// In-memory device, for bench testing without hardware.
    Simulated,
}

/// Tally device configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device name reported by `/status`.
    pub name: String,

    /// Enable tally override on the device at startup.
    /// Without override, tally writes are ignored by the device.
    pub enable_override: bool,

    pub backend: DeviceBackend,

    /// I2C adapter device node (e.g., "/dev/i2c-1").
    pub i2c_bus: String,

    /// 7-bit I2C address of the shield.
    pub i2c_address: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "bmd-sdi-tally".to_string(),
            enable_override: true,
            backend: DeviceBackend::I2c,
            i2c_bus: "/dev/i2c-1".to_string(),
            i2c_address: 0x6E,
        }
    }
}

/// Tally command protocol configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Total write/read-back cycles per command (initial + retries).
    pub max_attempts: u32,

    /// Fixed delay between verification cycles in milliseconds.
    pub retry_delay_ms: u64,

    /// Interval between bus write-readiness polls in milliseconds.
    pub ready_poll_ms: u64,

    /// Upper bound on the write-readiness wait in milliseconds.
    /// Absent means wait until the bus becomes ready.
    pub ready_timeout_ms: Option<u64>,
}

impl TallyConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms)
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 5,
            ready_poll_ms: 1,
            ready_timeout_ms: None,
        }
    }
}

/// Timeout configuration for connection handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum silence while waiting for request bytes, in seconds (0 = forever).
    pub idle_secs: u64,

    /// Deadline for writing a response, in seconds.
    pub write_secs: u64,
}

impl TimeoutConfig {
    pub fn idle(&self) -> Option<Duration> {
        (self.idle_secs > 0).then(|| Duration::from_secs(self.idle_secs))
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            idle_secs: 30,
            write_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
