//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts >= 1, poll interval > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{BridgeConfig, DeviceBackend};

/// Highest 7-bit I2C address.
const MAX_I2C_ADDRESS: u16 = 0x7F;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u64,
        value: u64,
    },

    #[error("{field}: must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        max: u64,
        value: u64,
    },

    #[error("{field}: must not be empty")]
    Empty { field: &'static str },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.device.name.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "device.name",
        });
    }

    if config.device.backend == DeviceBackend::I2c {
        if config.device.i2c_bus.trim().is_empty() {
            errors.push(ValidationError::Empty {
                field: "device.i2c_bus",
            });
        }
        if config.device.i2c_address > MAX_I2C_ADDRESS {
            errors.push(ValidationError::TooLarge {
                field: "device.i2c_address",
                max: u64::from(MAX_I2C_ADDRESS),
                value: u64::from(config.device.i2c_address),
            });
        }
    }

    check_min(
        &mut errors,
        "tally.max_attempts",
        1,
        u64::from(config.tally.max_attempts),
    );
    check_min(&mut errors, "tally.ready_poll_ms", 1, config.tally.ready_poll_ms);
    if let Some(timeout) = config.tally.ready_timeout_ms {
        check_min(
            &mut errors,
            "tally.ready_timeout_ms",
            config.tally.ready_poll_ms.max(1),
            timeout,
        );
    }
    check_min(&mut errors, "timeouts.write_secs", 1, config.timeouts.write_secs);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_min(errors: &mut Vec<ValidationError>, field: &'static str, min: u64, value: u64) {
    if value < min {
        errors.push(ValidationError::TooSmall { field, min, value });
    }
}
