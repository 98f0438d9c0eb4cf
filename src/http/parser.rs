//! Incremental request-line parser.
//!
//! Consumes a connection's bytes one at a time and extracts the request
//! path and query string into two fixed-capacity buffers. Nothing else of
//! the request is retained: header lines are only counted to find the
//! blank line that ends the request head.
//!
//! # State Machine
//! ```text
//! Idle ──'/'──▶ ReadingPath ──'?'──▶ ReadingQuery
//!                   │                     │
//!                  ' '                   ' '
//!                   ▼                     ▼
//!               AwaitingBlankLine ◀───────┘
//!                   │
//!          '\n' on an empty line
//!                   ▼
//!             RequestComplete
//! ```
//!
//! Carriage returns are dropped before any transition, so `\r\n` and `\n`
//! terminate lines identically. Bytes beyond a buffer's capacity are
//! discarded while the phase stays put.

use crate::http::request::RequestTarget;

/// Maximum bytes retained from the request path.
pub const PATH_CAPACITY: usize = 255;

/// Maximum bytes retained from the query string.
pub const QUERY_CAPACITY: usize = 511;

/// Parser phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// Skipping the method until the path's leading `/`.
    Idle,
    ReadingPath,
    ReadingQuery,
    /// Request line done; counting header lines until an empty one.
    AwaitingBlankLine,
    /// Blank line seen. Buffers are frozen.
    RequestComplete,
}

/// Fixed-capacity byte buffer that drops overflow.
#[derive(Debug, Clone)]
struct ScratchBuf<const N: usize> {
    bytes: [u8; N],
    len: usize,
    truncated: bool,
}

impl<const N: usize> ScratchBuf<N> {
    const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
            truncated: false,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.len < N {
            self.bytes[self.len] = byte;
            self.len += 1;
        } else {
            self.truncated = true;
        }
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Per-connection parse state.
#[derive(Debug, Clone)]
pub struct RequestParser {
    phase: ParsePhase,
    path: ScratchBuf<PATH_CAPACITY>,
    query: ScratchBuf<QUERY_CAPACITY>,
    line_len: usize,
}

impl RequestParser {
    pub const fn new() -> Self {
        Self {
            phase: ParsePhase::Idle,
            path: ScratchBuf::new(),
            query: ScratchBuf::new(),
            line_len: 0,
        }
    }

    pub fn phase(&self) -> ParsePhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == ParsePhase::RequestComplete
    }

    /// Consume one byte and return the resulting phase.
    ///
    /// Bytes fed after completion are ignored.
    pub fn feed(&mut self, byte: u8) -> ParsePhase {
        if self.is_complete() || byte == b'\r' {
            return self.phase;
        }

        match (self.phase, byte) {
            (ParsePhase::Idle, b'/') => self.phase = ParsePhase::ReadingPath,
            (ParsePhase::ReadingPath, b'?') => self.phase = ParsePhase::ReadingQuery,
            (ParsePhase::ReadingPath | ParsePhase::ReadingQuery, b' ') => {
                self.phase = ParsePhase::AwaitingBlankLine
            }
            (ParsePhase::ReadingPath, _) => self.path.push(byte),
            (ParsePhase::ReadingQuery, _) => self.query.push(byte),
            (ParsePhase::AwaitingBlankLine, b'\n') if self.line_len == 0 => {
                self.phase = ParsePhase::RequestComplete
            }
            _ => {}
        }

        if byte == b'\n' {
            self.line_len = 0;
        } else {
            self.line_len = self.line_len.saturating_add(1);
        }

        self.phase
    }

    /// Feed bytes until the request completes.
    ///
    /// Returns how many bytes were consumed; the remainder (if any) belongs
    /// to the request body and is left untouched.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> usize {
        for (i, &byte) in bytes.iter().enumerate() {
            if self.feed(byte) == ParsePhase::RequestComplete {
                return i + 1;
            }
        }
        bytes.len()
    }

    /// Bytes collected for the path so far (without the leading `/`).
    pub fn path(&self) -> &[u8] {
        self.path.as_slice()
    }

    /// Bytes collected for the query string so far (without the `?`).
    pub fn query(&self) -> &[u8] {
        self.query.as_slice()
    }

    /// Whether path or query bytes were dropped for lack of capacity.
    pub fn truncated(&self) -> bool {
        self.path.truncated || self.query.truncated
    }

    /// The frozen request target, once the request is complete.
    pub fn target(&self) -> Option<RequestTarget<'_>> {
        self.is_complete()
            .then(|| RequestTarget::new(self.path(), self.query()))
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}
