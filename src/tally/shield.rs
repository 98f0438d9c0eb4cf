//! SDI shield tally driver.
//!
//! # Responsibilities
//! - Map tally operations onto the shield's register file
//! - Drive the override tally bank (data, length, arm)
//! - Read back the incoming tally bank for verification and status
//!
//! The shield exposes 16-bit register addresses, sent little-endian ahead
//! of the data byte. On Linux the registers are reached through an I2C
//! adapter (`/dev/i2c-N`).

use crate::tally::bus::{BusError, TallyBus};
use crate::tally::types::{CameraId, TallyState};

const REG_IDENTIFIER: u16 = 0x0000;
const REG_CONTROL: u16 = 0x1000;
const REG_OT_ARM: u16 = 0x4000;
const REG_OT_LENGTH: u16 = 0x4001;
const REG_OT_DATA: u16 = 0x4100;
const REG_IT_LENGTH: u16 = 0x5001;
const REG_IT_DATA: u16 = 0x5100;

const CONTROL_TALLY_OVERRIDE: u8 = 1 << 1;
const ARM: u8 = 1 << 0;

const IDENTIFIER: &[u8; 4] = b"SDIC";

/// Byte-wide access to the shield's register file.
pub trait RegisterIo: Send {
    fn read_reg(&mut self, reg: u16) -> Result<u8, BusError>;
    fn write_reg(&mut self, reg: u16, value: u8) -> Result<(), BusError>;
}

/// `TallyBus` over the shield's registers.
#[derive(Debug)]
pub struct ShieldBus<R> {
    regs: R,
}

impl<R: RegisterIo> ShieldBus<R> {
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Whether the identifier register reads as an SDI shield.
    pub fn identify(&mut self) -> Result<bool, BusError> {
        let mut id = [0u8; 4];
        for (offset, byte) in (0u16..).zip(id.iter_mut()) {
            *byte = self.regs.read_reg(REG_IDENTIFIER + offset)?;
        }
        Ok(&id == IDENTIFIER)
    }

    fn write_tally(&mut self, camera: CameraId, state: TallyState) -> Result<(), BusError> {
        let offset = u16::from(camera.get() - 1);
        self.regs.write_reg(REG_OT_DATA + offset, state.to_bits())?;

        // The bank length must cover the camera or its data is not sent.
        if self.regs.read_reg(REG_OT_LENGTH)? < camera.get() {
            self.regs.write_reg(REG_OT_LENGTH, camera.get())?;
        }
        self.regs.write_reg(REG_OT_ARM, ARM)
    }
}

impl<R: RegisterIo> TallyBus for ShieldBus<R> {
    fn is_write_ready(&mut self) -> bool {
        match self.regs.read_reg(REG_OT_ARM) {
            Ok(arm) => arm & ARM == 0,
            Err(e) => {
                tracing::debug!(error = %e, "Override bank readiness read failed");
                false
            }
        }
    }

    fn set_tally(&mut self, camera: CameraId, state: TallyState) {
        if let Err(e) = self.write_tally(camera, state) {
            tracing::warn!(camera = %camera, error = %e, "Tally write failed");
        }
    }

    fn get_tally(&mut self, camera: CameraId) -> Result<TallyState, BusError> {
        if self.regs.read_reg(REG_IT_LENGTH)? < camera.get() {
            return Err(BusError::NotConnected(camera));
        }
        let bits = self.regs.read_reg(REG_IT_DATA + u16::from(camera.get() - 1))?;
        Ok(TallyState::from_bits(bits))
    }

    fn set_override(&mut self, enabled: bool) -> Result<(), BusError> {
        let control = self.regs.read_reg(REG_CONTROL)?;
        let control = if enabled {
            control | CONTROL_TALLY_OVERRIDE
        } else {
            control & !CONTROL_TALLY_OVERRIDE
        };
        self.regs.write_reg(REG_CONTROL, control)
    }
}

#[cfg(target_os = "linux")]
pub use linux::{open, I2cRegisters};

#[cfg(target_os = "linux")]
mod linux {
    use std::path::Path;

    use i2cdev::core::I2CDevice;
    use i2cdev::linux::LinuxI2CDevice;

    use super::{RegisterIo, ShieldBus};
    use crate::tally::bus::BusError;

    /// Shield registers behind an I2C device.
    #[derive(Debug)]
    pub struct I2cRegisters<D> {
        device: D,
    }

    impl<D> I2cRegisters<D> {
        pub fn new(device: D) -> Self {
            Self { device }
        }
    }

    impl<D> RegisterIo for I2cRegisters<D>
    where
        D: I2CDevice + Send,
        D::Error: std::fmt::Display,
    {
        fn read_reg(&mut self, reg: u16) -> Result<u8, BusError> {
            let mut value = [0u8; 1];
            self.device
                .write(&reg.to_le_bytes())
                .and_then(|()| self.device.read(&mut value))
                .map_err(|e| BusError::Transfer(format!("read 0x{reg:04x}: {e}")))?;
            Ok(value[0])
        }

        fn write_reg(&mut self, reg: u16, value: u8) -> Result<(), BusError> {
            let [lo, hi] = reg.to_le_bytes();
            self.device
                .write(&[lo, hi, value])
                .map_err(|e| BusError::Transfer(format!("write 0x{reg:04x}: {e}")))
        }
    }

    /// Open the shield at `address` on the adapter at `path`.
    pub fn open(
        path: &Path,
        address: u16,
    ) -> Result<ShieldBus<I2cRegisters<LinuxI2CDevice>>, BusError> {
        let device = LinuxI2CDevice::new(path, address)
            .map_err(|e| BusError::Open(format!("{} @ 0x{address:02x}: {e}", path.display())))?;

        let mut bus = ShieldBus::new(I2cRegisters::new(device));
        if !bus.identify()? {
            tracing::warn!(
                path = %path.display(),
                address = %format!("0x{address:02x}"),
                "Device does not identify as an SDI shield"
            );
        }
        Ok(bus)
    }
}
