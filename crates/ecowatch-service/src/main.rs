//! EcoWatch Service - Simulated sensor network and HTTP API.
//!
//! Run with: `cargo run -p ecowatch-service`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use ecowatch_service::{AppState, Collector, Config, api, ws};

/// EcoWatch Service - Simulated sensor network and HTTP REST API.
#[derive(Parser, Debug)]
#[command(name = "ecowatch-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Seed for a deterministic run (overrides config).
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the background tick driver (frozen data).
    #[arg(long)]
    no_collector: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ecowatch_service=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_else(|e| {
            warn!("Ignoring default config: {}", e);
            Config::default()
        }),
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    config.validate()?;

    let addr: SocketAddr = config.server.bind.parse()?;
    let state = AppState::from_config(config)?;

    let collector = if args.no_collector {
        info!("Background collector disabled");
        None
    } else {
        Some(Collector::new(Arc::clone(&state)).start())
    };

    let app = Router::new()
        .merge(api::router())
        .merge(ws::router())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(Arc::clone(&state));

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&state)))
        .await?;

    if let Some(handle) = collector {
        handle.await?;
    }
    info!("Shutdown complete");

    Ok(())
}

/// Resolve on Ctrl-C, stopping the collector first.
async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    state.collector.signal_stop();
}
