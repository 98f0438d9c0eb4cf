//! Tally device subsystem.
//!
//! # Data Flow
//! ```text
//! Router (tally request / status query)
//!     → controller.rs (readiness wait, write, read-back, bounded retry)
//!     → bus.rs (TallyBus trait: ready / set / get / override)
//!     → device.rs (backend chosen by config)
//!     → shield.rs (SDI shield registers over I2C) or simulated.rs
//! ```
//!
//! # Design Decisions
//! - Camera ids are validated at construction (`CameraId`), not by the bus
//! - Verification is binary per command; no partial success
//! - The device register is the only tally state; nothing is cached here

pub mod bus;
pub mod controller;
pub mod device;
pub mod shield;
pub mod simulated;
pub mod types;

pub use bus::{BusError, TallyBus};
pub use controller::TallyController;
pub use device::{open_device, DeviceBus};
pub use simulated::{BusStats, SimulatedBus};
pub use types::{
    CameraId, CameraReport, TallyError, TallyOutcome, TallyRequest, TallyState, MAX_CAMERAS,
};
