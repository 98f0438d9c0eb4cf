//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RequestTarget (path, query)
//!     → router.rs (exact path lookup → Route)
//!     → matcher.rs (query → TallyRequest, tally route only)
//!     → handlers.rs (invoke tally controller, build Response)
//! ```
//!
//! # Design Decisions
//! - Four fixed routes; no configuration
//! - Deterministic: same input always matches same route
//! - Never mutates parser state

pub mod handlers;
pub mod matcher;
pub mod router;

pub use router::{Route, Router};
