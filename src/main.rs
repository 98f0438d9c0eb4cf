//! SDI Camera Tally Bridge
//!
//! Serves a tiny HTTP API that sets and reports the program/preview tally
//! lights of up to four cameras over an SDI shield's tally channel.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request     ┌─────────┐    ┌─────────┐    ┌──────────┐    ┌────────────┐
//!     ──────────────────▶│   net   │───▶│  http   │───▶│ routing  │───▶│   tally    │
//!                        │listener │    │ parser  │    │ handlers │    │ controller │
//!                        └─────────┘    └─────────┘    └──────────┘    └─────┬──────┘
//!     Client Response         ▲                                             │
//!     ◀───────────────────────┴──── response (close after write) ◀──────────┤
//!                                                                           ▼
//!                                                                   ┌──────────────┐
//!                                                                   │  tally bus   │
//!                                                                   │ (SDI shield) │
//!                                                                   └──────────────┘
//!
//!     Cross-cutting: config, resilience (retry, deadlines), lifecycle, observability
//! ```
//!
//! Connections are served one at a time.

use std::path::PathBuf;

use clap::Parser;

use sdi_tally_bridge::config::{load_config, BridgeConfig};
use sdi_tally_bridge::lifecycle::{self, signals, Shutdown};
use sdi_tally_bridge::observability::{logging, metrics};
use sdi_tally_bridge::tally::open_device;

#[derive(Parser)]
#[command(name = "sdi-tally-bridge")]
#[command(about = "HTTP bridge for SDI camera tally lights", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    // Single-threaded: requests are served strictly one after another.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: BridgeConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        device = %config.device.name,
        backend = ?config.device.backend,
        bind_address = %config.listener.bind_address,
        max_attempts = config.tally.max_attempts,
        retry_delay_ms = config.tally.retry_delay_ms,
        "sdi-tally-bridge starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bus = open_device(&config.device)?;
    let bridge = lifecycle::start(config, bus).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(signals::listen(shutdown));

    bridge.run(shutdown_rx).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
