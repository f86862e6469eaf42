//! RWD gate service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http::server ─▶ http::request              │
//!                           │                      │ InboundRequest        │
//!                           │                      ▼                       │
//!                           │                gate::GateClient ─────────────┼──▶ Vcms upstream
//!                           │                      │ sections / raw / 302  │    (Gate-URL,
//!                           │                      ▼                       │     Gate-AffiliateId,
//!     Client Response       │               http::response                 │     Gate-Prefix)
//!     ◀─────────────────────┼── AxumResponseSink                           │
//!                           │                                              │
//!                           │  config (TOML) · observability (tracing,     │
//!                           │  Prometheus)                                 │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rwd_gate::config::{load_config, GateServiceConfig};
use rwd_gate::http::HttpServer;
use rwd_gate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rwd-gate")]
#[command(about = "Reverse gate to a Vcms content server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "rwd-gate.toml")]
    config: PathBuf,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config: GateServiceConfig = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("rwd-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_host = %config.gate.upstream_host,
        widgets = config.gate.widgets.len(),
        connect_timeout_secs = config.timeouts.connect_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config);
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
