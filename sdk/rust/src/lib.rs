//! HTTP client for the SDI tally bridge.

pub mod client;

pub use client::{CameraState, CameraStatus, DeviceStatus, StatusResponse, TallyClient, TallyResponse};
