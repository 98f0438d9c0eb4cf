//! The bridge's HTTP server loop.
//!
//! # Responsibilities
//! - Accept one connection at a time from the listener
//! - Drive the request parser over the connection's bytes
//! - Dispatch the completed request to the router
//! - Write the response and close before accepting again
//! - Stop accepting once shutdown is triggered
//!
//! Serving is strictly sequential. The tally controller owns the bus
//! exclusively, so it lives here and is lent to the router per request.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::Instrument;

use crate::config::TimeoutConfig;
use crate::http::parser::RequestParser;
use crate::lifecycle::ShutdownSignal;
use crate::net::{Connection, ConnectionError, Listener, ReadOutcome};
use crate::observability::metrics;
use crate::routing::Router;
use crate::tally::{TallyBus, TallyController};

/// Sequential HTTP server in front of the tally device.
pub struct BridgeServer<B> {
    controller: TallyController<B>,
    router: Router,
    timeouts: TimeoutConfig,
}

impl<B: TallyBus> BridgeServer<B> {
    pub fn new(controller: TallyController<B>, router: Router, timeouts: TimeoutConfig) -> Self {
        Self {
            controller,
            router,
            timeouts,
        }
    }

    /// Serve until `shutdown` fires.
    ///
    /// Shutdown is observed between connections only; a request being
    /// served (including its tally command) always runs to completion.
    pub async fn run(mut self, listener: Listener, mut shutdown: ShutdownSignal) {
        tracing::info!(address = %listener.local_addr(), "HTTP server starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let conn = Connection::new(stream, peer, &self.timeouts);
                        let span = tracing::info_span!(
                            "connection",
                            connection_id = %conn.id(),
                            peer = %conn.peer(),
                        );
                        self.serve(conn).instrument(span).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                    }
                },
            }
        }

        tracing::info!("HTTP server stopped");
    }

    async fn serve<S: AsyncRead + AsyncWrite + Unpin>(&mut self, mut conn: Connection<S>) {
        let mut parser = RequestParser::new();

        match conn.read_request(&mut parser).await {
            Ok(ReadOutcome::Complete) => {}
            Ok(ReadOutcome::Abandoned) => {
                tracing::debug!(
                    phase = ?parser.phase(),
                    "Peer closed before request completed, discarding"
                );
                metrics::record_abandoned_connection();
                return;
            }
            Err(ConnectionError::IdleTimeout) => {
                tracing::debug!(phase = ?parser.phase(), "Peer idle, closing without response");
                metrics::record_abandoned_connection();
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Connection failed while reading request");
                return;
            }
        }

        if parser.truncated() {
            tracing::debug!(
                path_len = parser.path().len(),
                query_len = parser.query().len(),
                "Request target truncated to buffer capacity"
            );
        }

        let Some(target) = parser.target() else {
            return;
        };

        let (route, response) = self.router.dispatch(&target, &mut self.controller).await;
        let status = response.status.code();

        tracing::debug!(
            route = route.name(),
            status,
            path = %target.path_str(),
            query = %target.query_str(),
            "Request dispatched"
        );
        metrics::record_request(route.name(), status);

        if let Err(e) = conn.respond(&response).await {
            tracing::warn!(error = %e, "Failed to write response");
        }
    }
}
