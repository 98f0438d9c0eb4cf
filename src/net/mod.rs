//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, one connection at a time)
//!     → connection.rs (feed parser, deadlines, write + close)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Accepted → Reading → Responding → Closed
//!                  └──── peer gone ────▶ Abandoned
//! ```
//!
//! # Design Decisions
//! - No concurrent connections; the OS backlog is the queue
//! - Request bytes are never buffered beyond one small read chunk

pub mod connection;
pub mod listener;

pub use connection::{Connection, ConnectionError, ConnectionId, ReadOutcome};
pub use listener::{Listener, ListenerError};
