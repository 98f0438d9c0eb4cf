//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Put the tally device into override mode
//! - Bind the listener and assemble the server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The device is prepared before the listener binds (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::{validate_config, BridgeConfig, ValidationError};
use crate::http::BridgeServer;
use crate::lifecycle::ShutdownSignal;
use crate::net::{Listener, ListenerError};
use crate::routing::Router;
use crate::tally::{BusError, TallyBus, TallyController};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join(.0))]
    Config(Vec<ValidationError>),
    #[error("tally device setup failed: {0}")]
    Device(#[from] BusError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A bridge that is bound and ready to serve.
pub struct Bridge<B> {
    server: BridgeServer<B>,
    listener: Listener,
}

impl<B: TallyBus> Bridge<B> {
    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Serve requests until `shutdown` fires.
    pub async fn run(self, shutdown: ShutdownSignal) {
        self.server.run(self.listener, shutdown).await;
    }
}

/// Prepare the device and bind the listener.
pub async fn start<B: TallyBus>(config: BridgeConfig, bus: B) -> Result<Bridge<B>, StartupError> {
    validate_config(&config).map_err(StartupError::Config)?;

    let mut controller = TallyController::new(bus, &config.tally);
    if config.device.enable_override {
        controller.enable_override()?;
        tracing::info!(device = %config.device.name, "Tally override enabled");
    } else {
        tracing::warn!(
            device = %config.device.name,
            "Tally override left disabled, tally writes will have no effect"
        );
    }

    let listener = Listener::bind(&config.listener).await?;
    let router = Router::new(config.device.name);
    let server = BridgeServer::new(controller, router, config.timeouts);

    Ok(Bridge { server, listener })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::SimulatedBus;

    fn local_config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config
    }

    #[tokio::test]
    async fn start_enables_override_and_binds() {
        let bus = SimulatedBus::new();
        let bridge = start(local_config(), bus.clone()).await.unwrap();

        assert!(bus.override_enabled());
        assert_ne!(bridge.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn override_can_be_left_off() {
        let bus = SimulatedBus::new();
        let mut config = local_config();
        config.device.enable_override = false;

        start(config, bus.clone()).await.unwrap();
        assert!(!bus.override_enabled());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_touching_the_device() {
        let bus = SimulatedBus::new();
        let mut config = local_config();
        config.tally.max_attempts = 0;

        let err = start(config, bus.clone()).await.err().unwrap();
        assert!(matches!(err, StartupError::Config(ref errors) if errors.len() == 1));
        assert!(!bus.override_enabled());
    }
}
