//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Tally command:
//!     → timeouts.rs (poll bus write-readiness, optionally bounded)
//!     → retries.rs (bounded write/read-back cycles, fixed delay)
//!
//! Connection I/O:
//!     → timeouts.rs (idle read deadline, response write deadline)
//! ```
//!
//! # Design Decisions
//! - Retries exist only below the HTTP layer; each request is answered once
//! - Waits always yield to the runtime between checks

pub mod retries;
pub mod timeouts;
