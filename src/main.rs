//! Least-traffic HTTP load balancer.
//!
//! ```text
//!     Client ──▶ listener ──▶ select backend ──▶ forward ──▶ Backend
//!                               ▲      (least traffic)   │
//!                               │                        │ response bytes
//!                          traffic ledger ◀──────────────┘
//!                               ▲
//!                               │ -1 on failed probe
//!                        health tasks (one per backend)
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use traffic_balancer::cli::Cli;
use traffic_balancer::http::HttpServer;
use traffic_balancer::lifecycle::{Shutdown, signals};
use traffic_balancer::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability)?;

    tracing::info!("traffic-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        timeout_secs = config.timeouts.request_secs,
        https = config.backends.https,
        backends = ?config.backends.addresses,
        "Configuration loaded"
    );
    tracing::info!("Tracing support enabled: {}", config.backends.trace);
    if config.backends.addresses.is_empty() {
        tracing::warn!("Backend pool is empty; every request will be answered with 503");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting load balancer...");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
