//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection
//!     → server.rs (sequential accept loop, per-connection span)
//!     → parser.rs (byte-at-a-time request-line state machine)
//!     → request.rs (frozen path + query view)
//!     → [routing layer picks the handler]
//!     → response.rs (status line, fixed headers, body)
//!     → Write, close
//! ```

pub mod parser;
pub mod request;
pub mod response;
pub mod server;

pub use parser::{ParsePhase, RequestParser};
pub use request::RequestTarget;
pub use response::{ContentType, Response, Status};
pub use server::BridgeServer;
