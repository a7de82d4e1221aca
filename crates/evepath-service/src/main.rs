//! Wormhole-aware route planning HTTP service.
//!
//! # Configuration
//!
//! - `EVEPATH_SYSTEMS_PATH` - Path to the systems JSON dataset (default: data/systems.json)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//!
//! Dynamic sources are configured through the variables documented on
//! [`evepath_lib::SourcesConfig`].

use std::env;
use std::net::SocketAddr;

use tracing::{error, info};

use evepath_lib::{default_dataset_path, SourcesConfig};
use evepath_service::{init_logging, router, AppState, LoggingConfig};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("path");
    init_logging(&logging_config);

    let dataset = default_dataset_path();
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let sources = SourcesConfig::from_env();

    info!(
        dataset = %dataset.display(),
        port,
        eve_scout = sources.eve_scout.is_some(),
        tripwire = sources.tripwire.is_some(),
        eve_metro = sources.eve_metro.is_some(),
        "starting path service"
    );

    let state = AppState::load(&dataset, &sources).map_err(|e| {
        error!(error = %e, path = %dataset.display(), "failed to load application state");
        e
    })?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
