//! SDI Camera Tally Bridge Library
//!
//! HTTP front end for a camera tally controller on an SDI shield.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;
pub mod tally;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::BridgeConfig;
pub use http::BridgeServer;
pub use lifecycle::{Bridge, Shutdown};
pub use tally::{open_device, DeviceBus, SimulatedBus, TallyBus, TallyController};
