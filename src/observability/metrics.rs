//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define bridge metrics (requests, tally commands, abandoned connections)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `bridge_requests_total` (counter): requests by route, status
//! - `bridge_connections_abandoned_total` (counter): peers gone before a full request
//! - `bridge_tally_commands_total` (counter): tally commands by camera, result
//!   (`verified`, `failed`, `not_ready`)
//! - `bridge_tally_attempts` (histogram): write/read-back cycles per command
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::tally::{CameraId, TallyError, TallyOutcome};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16) {
    ::metrics::counter!(
        "bridge_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_abandoned_connection() {
    ::metrics::counter!("bridge_connections_abandoned_total").increment(1);
}

/// `result` label for a finished or aborted tally command.
pub fn tally_result_label(result: &Result<TallyOutcome, TallyError>) -> &'static str {
    match result {
        Ok(outcome) if outcome.success => "verified",
        Ok(_) => "failed",
        Err(TallyError::NotReady { .. }) => "not_ready",
    }
}

pub fn record_tally(camera: CameraId, result: &Result<TallyOutcome, TallyError>) {
    ::metrics::counter!(
        "bridge_tally_commands_total",
        "camera" => camera.to_string(),
        "result" => tally_result_label(result)
    )
    .increment(1);
    if let Ok(outcome) = result {
        ::metrics::histogram!("bridge_tally_attempts").record(f64::from(outcome.attempts));
    }
}
