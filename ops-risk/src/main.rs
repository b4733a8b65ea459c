//! ops-risk - Risk Fusion Microservice
//!
//! Fuses per-modality fraud scores (visual, audio, behavioral, network,
//! textual) into one risk verdict, and recalibrates its modality weights
//! from labeled outcomes. Dashboards follow weight changes and non-genuine
//! verdicts over SSE at `/risk/events`.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

use ops_risk::config::RiskServiceConfig;
use ops_risk::AppState;

#[derive(Parser, Debug)]
#[command(name = "ops-risk")]
#[command(about = "Risk fusion microservice for Ops Tower")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "OPS_RISK_PORT")]
    port: Option<u16>,

    /// Config file (falls back to OPS_TOWER_CONFIG, then platform defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        RiskServiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    ops_common::logging::init(&config.logging).context("Failed to initialize logging")?;

    info!("Starting ops-risk v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(&config).context("Invalid fusion configuration")?;
    info!(
        "Fusion weights v{} loaded: {:?}",
        state.weights.snapshot().version(),
        state.weights.snapshot().as_map()
    );
    info!("Fusion thresholds: {:?}", state.aggregator.thresholds());

    let app = ops_risk::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
