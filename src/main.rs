//! Edge gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌──────────────────────────────────────────────────────────────┐
//!                │                        EDGE GATEWAY                           │
//!   Client       │  ┌──────────┐  ┌───────┐  ┌──────┐  ┌────────────┐  ┌───────┐ │
//!   ─────────────┼─▶│ denylist │─▶│ route │─▶│ auth │─▶│ rate limit │─▶│ body  │ │
//!                │  └──────────┘  └───────┘  └──────┘  └────────────┘  └───┬───┘ │
//!                │                                                         ▼     │
//!                │  ┌──────────┐  ┌───────────┐  ┌───────────┐      ┌─────────┐  │
//!   ◀────────────┼──│ response │◀─│ forwarder │◀─│  request  │◀─────│  cache  │  │
//!                │  │ sanitize │  │  (hyper)  │  │ transform │ miss └─────────┘  │
//!                │  └──────────┘  └─────┬─────┘  └───────────┘                   │
//!                └──────────────────────┼────────────────────────────────────────┘
//!                                       ▼
//!                          user / gamification / ai / content / integrations
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config;
use edge_gateway::http::server::bind_address;
use edge_gateway::lifecycle::{spawn_signal_handler, Shutdown};
use edge_gateway::observability::{logging, metrics};
use edge_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "edge-gateway", version, about = "API edge gateway")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = config::load(args.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        enforce_auth = config.auth.enforce,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let addr = bind_address(&config)?;
    let server = GatewayServer::new(config)?;
    let listener = TcpListener::bind(addr).await?;

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
