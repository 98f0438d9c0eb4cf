//! Tally command protocol.
//!
//! # Responsibilities
//! - Apply a requested (program, preview) pair to one camera
//! - Confirm delivery by reading the device state back
//! - Report per-camera state for status queries
//!
//! # Protocol
//! ```text
//! wait for write-readiness (poll, optionally bounded)
//! write desired state
//! repeat up to max_attempts:
//!     [retry only: re-write, then fixed settle delay]
//!     read back → exact match? success
//! exhausted → failure + diagnostic (camera, wanted, last observed)
//! ```
//!
//! # Design Decisions
//! - The verdict reflects observed device state, never the write call alone
//! - The controller owns the bus; nothing else touches it
//! - A started command always runs to completion

use std::time::Duration;

use crate::config::TallyConfig;
use crate::observability::metrics;
use crate::resilience::retries::RetryPolicy;
use crate::resilience::timeouts::wait_until;
use crate::tally::bus::{BusError, TallyBus};
use crate::tally::types::{
    CameraId, CameraReport, TallyError, TallyOutcome, TallyRequest, TallyState,
};

/// Drives the tally device with read-back verification.
#[derive(Debug)]
pub struct TallyController<B> {
    bus: B,
    retry: RetryPolicy,
    ready_poll: Duration,
    ready_timeout: Option<Duration>,
}

impl<B: TallyBus> TallyController<B> {
    pub fn new(bus: B, config: &TallyConfig) -> Self {
        Self {
            bus,
            retry: RetryPolicy::from_config(config),
            ready_poll: config.ready_poll(),
            ready_timeout: config.ready_timeout(),
        }
    }

    /// Enable tally override so that subsequent writes take effect.
    pub fn enable_override(&mut self) -> Result<(), BusError> {
        self.bus.set_override(true)
    }

    /// Apply `request` and verify it by read-back.
    ///
    /// Only a bounded readiness wait that expires is an error; an
    /// unverified write is reported through `TallyOutcome::success`.
    pub async fn apply(&mut self, request: TallyRequest) -> Result<TallyOutcome, TallyError> {
        let result = self.run_command(request).await;
        metrics::record_tally(request.camera, &result);
        result
    }

    async fn run_command(&mut self, request: TallyRequest) -> Result<TallyOutcome, TallyError> {
        let TallyRequest { camera, desired } = request;

        let bus = &mut self.bus;
        let polls = wait_until(|| bus.is_write_ready(), self.ready_poll, self.ready_timeout)
            .await
            .map_err(|e| {
                tracing::warn!(
                    camera = %camera,
                    waited = ?e.waited,
                    polls = e.polls,
                    "Tally bus never became ready"
                );
                TallyError::NotReady {
                    waited: e.waited,
                    polls: e.polls,
                }
            })?;
        tracing::trace!(camera = %camera, polls, "Tally bus ready");

        let mut observed = None;
        let mut attempts = 0;

        self.bus.set_tally(camera, desired);

        for attempt in self.retry.attempts() {
            if let Some(delay) = self.retry.settle_delay(attempt) {
                self.bus.set_tally(camera, desired);
                tokio::time::sleep(delay).await;
            }
            attempts = attempt;

            match self.bus.get_tally(camera) {
                Ok(state) if state == desired => {
                    tracing::debug!(camera = %camera, state = %state, attempt, "Tally verified");
                    return Ok(TallyOutcome {
                        request,
                        observed: Some(state),
                        attempts,
                        success: true,
                    });
                }
                Ok(state) => {
                    tracing::debug!(camera = %camera, wanted = %desired, got = %state, attempt, "Tally read-back mismatch");
                    observed = Some(state);
                }
                Err(e) => {
                    tracing::debug!(camera = %camera, error = %e, attempt, "Tally read-back failed");
                }
            }
        }

        tracing::warn!(
            camera = %camera,
            wanted_pgm = desired.program,
            wanted_pvw = desired.preview,
            got = %observed.map_or_else(|| "unreadable".to_string(), |s| s.to_string()),
            attempts,
            "Tally state verification failed"
        );

        Ok(TallyOutcome {
            request,
            observed,
            attempts,
            success: false,
        })
    }

    /// Read one camera's state without modifying it.
    pub fn read(&mut self, camera: CameraId) -> Result<TallyState, BusError> {
        self.bus.get_tally(camera)
    }

    /// Read every camera. Unreadable cameras are reported as disconnected.
    pub fn report(&mut self) -> Vec<CameraReport> {
        CameraId::all()
            .map(|id| match self.read(id) {
                Ok(state) => CameraReport {
                    id,
                    connected: true,
                    state,
                },
                Err(e) => {
                    tracing::debug!(camera = %id, error = %e, "Camera unreadable");
                    CameraReport {
                        id,
                        connected: false,
                        state: TallyState::OFF,
                    }
                }
            })
            .collect()
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}
