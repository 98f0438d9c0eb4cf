//! Bus tally endpoint abstraction.
//!
//! The tally device sits on a low-bandwidth control bus. Writes are only
//! accepted while the device's override bank reports ready, and reads can
//! fail when a camera slot carries no tally data.

use thiserror::Error;

use crate::tally::types::{CameraId, TallyState};

/// Errors reported by the control bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// No tally data is available for the camera.
    #[error("camera {0} not connected")]
    NotConnected(CameraId),

    /// The device could not be opened.
    #[error("cannot open tally device: {0}")]
    Open(String),

    /// The bus transaction itself failed.
    #[error("bus transfer failed: {0}")]
    Transfer(String),
}

/// A tally device reachable over the control bus.
pub trait TallyBus: Send {
    /// Whether the device currently accepts a tally write.
    fn is_write_ready(&mut self) -> bool;

    /// Write the tally bits for one camera. Delivery is not confirmed.
    fn set_tally(&mut self, camera: CameraId, state: TallyState);

    /// Read back the tally bits for one camera.
    fn get_tally(&mut self, camera: CameraId) -> Result<TallyState, BusError>;

    /// Enable or disable tally override. Writes have no effect while disabled.
    fn set_override(&mut self, enabled: bool) -> Result<(), BusError>;
}
