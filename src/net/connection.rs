//! Connection lifecycle.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Feed received bytes into the request parser until the request completes
//! - Enforce the idle read deadline and the response write deadline
//! - Close the connection once the response is written
//!
//! A peer that disconnects before the blank line is abandoned: nothing is
//! written back and the partial request is discarded.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::TimeoutConfig;
use crate::http::parser::RequestParser;
use crate::http::response::Response;
use crate::resilience::timeouts::with_deadline;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Bytes pulled from the socket per read. The parser consumes them one by one.
const READ_CHUNK: usize = 64;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// How reading a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The blank line after the headers arrived.
    Complete,
    /// The peer closed the connection first.
    Abandoned,
}

/// Connection-level failures. None of these produce a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),
    #[error("peer idle beyond read deadline")]
    IdleTimeout,
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("response write exceeded {0:?}")]
    WriteTimeout(Duration),
}

/// One accepted client connection.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    id: ConnectionId,
    peer: SocketAddr,
    stream: S,
    idle: Option<Duration>,
    write_deadline: Duration,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, peer: SocketAddr, timeouts: &TimeoutConfig) -> Self {
        Self {
            id: ConnectionId::new(),
            peer,
            stream,
            idle: timeouts.idle(),
            write_deadline: timeouts.write(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Read until `parser` completes or the peer goes away.
    pub async fn read_request(
        &mut self,
        parser: &mut RequestParser,
    ) -> Result<ReadOutcome, ConnectionError> {
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let read = with_deadline(self.idle, self.stream.read(&mut chunk))
                .await
                .map_err(|_| ConnectionError::IdleTimeout)?;

            let n = match read {
                Ok(0) => return Ok(ReadOutcome::Abandoned),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::ConnectionReset => {
                    return Ok(ReadOutcome::Abandoned)
                }
                Err(e) => return Err(ConnectionError::Read(e)),
            };

            parser.feed_slice(&chunk[..n]);
            if parser.is_complete() {
                return Ok(ReadOutcome::Complete);
            }
        }
    }

    /// Write the response and close the sending side.
    pub async fn respond(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let deadline = self.write_deadline;
        with_deadline(Some(deadline), response.write_to(&mut self.stream))
            .await
            .map_err(|_| ConnectionError::WriteTimeout(deadline))?
            .map_err(ConnectionError::Write)?;

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(connection_id = %self.id, error = %e, "Shutdown after response failed");
        }
        Ok(())
    }
}
