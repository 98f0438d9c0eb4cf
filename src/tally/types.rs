//! Tally domain types and error definitions.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Number of camera slots addressable on the tally device.
pub const MAX_CAMERAS: u8 = 4;

/// Camera identifier, always within `1..=MAX_CAMERAS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CameraId(u8);

impl CameraId {
    /// Camera 1, the fallback for requests that name no valid camera.
    pub const FIRST: CameraId = CameraId(1);

    /// Returns `None` for ids outside the device's camera range.
    pub fn new(id: u8) -> Option<Self> {
        (1..=MAX_CAMERAS).contains(&id).then_some(Self(id))
    }

    /// Every camera the device exposes, in ascending order.
    pub fn all() -> impl Iterator<Item = CameraId> {
        (1..=MAX_CAMERAS).map(CameraId)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based register slot for this camera.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A camera's program/preview indicator pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TallyState {
    pub program: bool,
    pub preview: bool,
}

impl TallyState {
    const PROGRAM_BIT: u8 = 0b01;
    const PREVIEW_BIT: u8 = 0b10;

    pub const OFF: TallyState = TallyState {
        program: false,
        preview: false,
    };

    pub fn new(program: bool, preview: bool) -> Self {
        Self { program, preview }
    }

    /// Encode as the device's per-camera tally byte.
    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.program {
            bits |= Self::PROGRAM_BIT;
        }
        if self.preview {
            bits |= Self::PREVIEW_BIT;
        }
        bits
    }

    /// Decode a tally byte; bits other than program/preview are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            program: bits & Self::PROGRAM_BIT != 0,
            preview: bits & Self::PREVIEW_BIT != 0,
        }
    }
}

impl fmt::Display for TallyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pgm:{} pvw:{}",
            u8::from(self.program),
            u8::from(self.preview)
        )
    }
}

/// A requested tally change for one camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyRequest {
    pub camera: CameraId,
    pub desired: TallyState,
}

impl TallyRequest {
    pub fn new(camera: CameraId, program: bool, preview: bool) -> Self {
        Self {
            camera,
            desired: TallyState::new(program, preview),
        }
    }
}

/// Result of a verified tally command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyOutcome {
    pub request: TallyRequest,
    /// Last successful read-back, if any read succeeded.
    pub observed: Option<TallyState>,
    /// Write/read-back cycles performed.
    pub attempts: u32,
    pub success: bool,
}

/// Per-camera entry of a device status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CameraReport {
    pub id: CameraId,
    pub connected: bool,
    pub state: TallyState,
}

/// Errors that abort a tally command before any write is issued.
#[derive(Debug, Error)]
pub enum TallyError {
    /// The bus did not signal write-readiness within the configured bound.
    #[error("tally bus not ready after {waited:?} ({polls} polls)")]
    NotReady { waited: Duration, polls: u32 },
}
