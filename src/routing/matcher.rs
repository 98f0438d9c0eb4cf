//! Tally parameter matching.
//!
//! # Responsibilities
//! - Turn a query string into a `TallyRequest`
//!
//! # Design Decisions
//! - Literal substring patterns only (`cam=1`..`cam=4`, `pgm=1`, `pvw=1`)
//! - Absent or unrecognized parameters fall back to defaults
//!   (camera 1, program off, preview off); nothing is rejected
//! - Cameras are checked in ascending order; the first pattern found wins

use crate::http::request::RequestTarget;
use crate::tally::{CameraId, TallyRequest};

const PROGRAM_ON: &str = "pgm=1";
const PREVIEW_ON: &str = "pvw=1";

/// Camera named by the query, or camera 1.
pub fn camera_from_query(target: &RequestTarget<'_>) -> CameraId {
    CameraId::all()
        .find(|id| target.query_contains(&format!("cam={id}")))
        .unwrap_or(CameraId::FIRST)
}

/// Build the tally request encoded in the query string.
pub fn tally_request_from_query(target: &RequestTarget<'_>) -> TallyRequest {
    TallyRequest::new(
        camera_from_query(target),
        target.query_contains(PROGRAM_ON),
        target.query_contains(PREVIEW_ON),
    )
}
