//! Room occupancy control service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ request log ──▶ bearer auth ──▶ handlers
//!                                                                      │
//!                         ┌────────────────────┬───────────────────────┤
//!                         ▼                    ▼                       ▼
//!                   ┌───────────┐        ┌───────────┐          ┌─────────────┐
//!                   │ admission │        │   rooms   │          │    query    │
//!                   │ (per-room │        │ registry  │          │   engine    │
//!                   │   lock)   │        └─────┬─────┘          └──────┬──────┘
//!                   └─────┬─────┘              │                       │
//!                         ▼                    ▼                       ▼
//!                   ┌──────────────────────────────┐         ┌─────────────────┐
//!                   │ store (rooms, visits, JSON   │         │ audit log (JSONL│
//!                   │ snapshot)                    │         │ journal)        │
//!                   └──────────────────────────────┘         └─────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use room_occupancy::config::load_or_default;
use room_occupancy::lifecycle::{self, Shutdown};
use room_occupancy::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(author, version, about = "Room occupancy control service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "occupancy.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(&args.config)?;

    logging::init_logging(&config.observability);
    tracing::info!("room-occupancy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        rooms = config.rooms.len(),
        write_through = config.storage.write_through,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = lifecycle::start(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
