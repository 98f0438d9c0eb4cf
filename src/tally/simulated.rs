//! In-memory tally device.
//!
//! # Responsibilities
//! - Model the device's per-camera tally register bank
//! - Honor the override switch (writes ignored while disabled)
//! - Inject faults: busy bus, disconnected or stuck cameras, failing reads
//! - Count bus transactions for inspection
//!
//! Clones share the same device, so a handle kept outside the bridge
//! observes and steers the bus the bridge is driving.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::tally::bus::{BusError, TallyBus};
use crate::tally::types::{CameraId, TallyState, MAX_CAMERAS};

const SLOTS: usize = MAX_CAMERAS as usize;

/// Bus transaction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    pub writes: u32,
    pub reads: u32,
    pub ready_polls: u32,
}

#[derive(Debug)]
struct DeviceState {
    registers: [u8; SLOTS],
    override_enabled: bool,
    connected: [bool; SLOTS],
    stuck: [Option<TallyState>; SLOTS],
    busy_polls: u32,
    dropped_writes: u32,
    failing_reads: u32,
    stats: BusStats,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            registers: [0; SLOTS],
            override_enabled: false,
            connected: [true; SLOTS],
            stuck: [None; SLOTS],
            busy_polls: 0,
            dropped_writes: 0,
            failing_reads: 0,
            stats: BusStats::default(),
        }
    }
}

/// A simulated tally device with fault injection.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBus {
    state: Arc<Mutex<DeviceState>>,
}

impl SimulatedBus {
    /// A healthy device with all cameras connected and override disabled.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().expect("simulated bus mutex poisoned")
    }

    /// Report not-ready for the next `polls` readiness checks.
    pub fn busy_for(&self, polls: u32) {
        self.lock().busy_polls = polls;
    }

    /// Ignore the next `count` tally writes.
    pub fn drop_writes(&self, count: u32) {
        self.lock().dropped_writes = count;
    }

    /// Fail the next `count` reads with a transfer error.
    pub fn fail_reads(&self, count: u32) {
        self.lock().failing_reads = count;
    }

    /// Mark a camera's tally slot as (dis)connected.
    pub fn set_connected(&self, camera: CameraId, connected: bool) {
        self.lock().connected[camera.index()] = connected;
    }

    /// Pin a camera to `state`: writes are ignored and reads return `state`.
    pub fn stick(&self, camera: CameraId, state: TallyState) {
        self.lock().stuck[camera.index()] = Some(state);
    }

    /// Release a camera pinned by [`SimulatedBus::stick`].
    pub fn unstick(&self, camera: CameraId) {
        self.lock().stuck[camera.index()] = None;
    }

    /// Raw register contents for a camera, bypassing faults.
    pub fn register(&self, camera: CameraId) -> TallyState {
        TallyState::from_bits(self.lock().registers[camera.index()])
    }

    pub fn override_enabled(&self) -> bool {
        self.lock().override_enabled
    }

    pub fn stats(&self) -> BusStats {
        self.lock().stats
    }

    pub fn reset_stats(&self) {
        self.lock().stats = BusStats::default();
    }
}

impl TallyBus for SimulatedBus {
    fn is_write_ready(&mut self) -> bool {
        let mut device = self.lock();
        device.stats.ready_polls += 1;
        if device.busy_polls > 0 {
            device.busy_polls -= 1;
            return false;
        }
        true
    }

    fn set_tally(&mut self, camera: CameraId, state: TallyState) {
        let mut device = self.lock();
        device.stats.writes += 1;

        let slot = camera.index();
        if device.dropped_writes > 0 {
            device.dropped_writes -= 1;
            return;
        }
        if !device.override_enabled || !device.connected[slot] || device.stuck[slot].is_some() {
            return;
        }
        device.registers[slot] = state.to_bits();
    }

    fn get_tally(&mut self, camera: CameraId) -> Result<TallyState, BusError> {
        let mut device = self.lock();
        device.stats.reads += 1;

        if device.failing_reads > 0 {
            device.failing_reads -= 1;
            return Err(BusError::Transfer("read NAK".to_string()));
        }

        let slot = camera.index();
        if !device.connected[slot] {
            return Err(BusError::NotConnected(camera));
        }
        if let Some(state) = device.stuck[slot] {
            return Ok(state);
        }
        Ok(TallyState::from_bits(device.registers[slot]))
    }

    fn set_override(&mut self, enabled: bool) -> Result<(), BusError> {
        self.lock().override_enabled = enabled;
        Ok(())
    }
}
