//! Tally device selection.
//!
//! Picks the bus implementation named by `device.backend`. The shield over
//! I2C is the default; the simulated device must be chosen explicitly.

use crate::config::{DeviceBackend, DeviceConfig};
use crate::tally::bus::{BusError, TallyBus};
use crate::tally::simulated::SimulatedBus;
use crate::tally::types::{CameraId, TallyState};

#[cfg(target_os = "linux")]
use std::path::Path;

#[cfg(target_os = "linux")]
use crate::tally::shield::{self, I2cRegisters, ShieldBus};

/// The configured tally device.
pub enum DeviceBus {
    #[cfg(target_os = "linux")]
    Shield(ShieldBus<I2cRegisters<i2cdev::linux::LinuxI2CDevice>>),
    Simulated(SimulatedBus),
}

/// Open the device described by `config`.
pub fn open_device(config: &DeviceConfig) -> Result<DeviceBus, BusError> {
    match config.backend {
        DeviceBackend::Simulated => {
            tracing::warn!(
                device = %config.name,
                "Using the simulated tally device, no camera tally lights will change"
            );
            Ok(DeviceBus::Simulated(SimulatedBus::new()))
        }
        DeviceBackend::I2c => open_shield(config),
    }
}

#[cfg(target_os = "linux")]
fn open_shield(config: &DeviceConfig) -> Result<DeviceBus, BusError> {
    let bus = shield::open(Path::new(&config.i2c_bus), config.i2c_address)?;
    tracing::info!(
        i2c_bus = %config.i2c_bus,
        i2c_address = %format!("0x{:02x}", config.i2c_address),
        "SDI shield opened"
    );
    Ok(DeviceBus::Shield(bus))
}

#[cfg(not(target_os = "linux"))]
fn open_shield(_config: &DeviceConfig) -> Result<DeviceBus, BusError> {
    Err(BusError::Open(
        "the i2c backend is only available on Linux".to_string(),
    ))
}

impl TallyBus for DeviceBus {
    fn is_write_ready(&mut self) -> bool {
        match self {
            #[cfg(target_os = "linux")]
            DeviceBus::Shield(bus) => bus.is_write_ready(),
            DeviceBus::Simulated(bus) => bus.is_write_ready(),
        }
    }

    fn set_tally(&mut self, camera: CameraId, state: TallyState) {
        match self {
            #[cfg(target_os = "linux")]
            DeviceBus::Shield(bus) => bus.set_tally(camera, state),
            DeviceBus::Simulated(bus) => bus.set_tally(camera, state),
        }
    }

    fn get_tally(&mut self, camera: CameraId) -> Result<TallyState, BusError> {
        match self {
            #[cfg(target_os = "linux")]
            DeviceBus::Shield(bus) => bus.get_tally(camera),
            DeviceBus::Simulated(bus) => bus.get_tally(camera),
        }
    }

    fn set_override(&mut self, enabled: bool) -> Result<(), BusError> {
        match self {
            #[cfg(target_os = "linux")]
            DeviceBus::Shield(bus) => bus.set_override(enabled),
            DeviceBus::Simulated(bus) => bus.set_override(enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_backend_opens_without_hardware() {
        let config = DeviceConfig {
            backend: DeviceBackend::Simulated,
            ..DeviceConfig::default()
        };
        let mut bus = open_device(&config).unwrap();

        assert!(matches!(bus, DeviceBus::Simulated(_)));
        assert!(bus.is_write_ready());
    }

    #[test]
    fn missing_adapter_fails_to_open() {
        let config = DeviceConfig {
            i2c_bus: "/dev/i2c-does-not-exist".to_string(),
            ..DeviceConfig::default()
        };
        let err = open_device(&config).err().unwrap();

        assert!(matches!(err, BusError::Open(_)));
    }
}
