// =============================================================================
// SwingLens — Main Entry Point
// =============================================================================
//
// Per-request swing-checklist analysis over HTTP: fetch a bar series, compute
// EMA/ATR, detect swing levels, evaluate the setup booleans, derive risk
// levels, and serve the aggregated verdict to the presentation layer.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod cache;
mod config;
mod engine;
mod error;
mod indicators;
mod levels;
mod market_data;
mod patterns;
mod risk;
mod signals;
mod timeframe;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::RuntimeConfig;

const CONFIG_PATH: &str = "swinglens_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("SwingLens analysis service starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Env overrides for containerised deployments.
    if let Ok(addr) = std::env::var("SWINGLENS_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(url) = std::env::var("SWINGLENS_CHART_BASE_URL") {
        config.chart_base_url = url;
    }

    info!(
        bind_addr = %config.bind_addr,
        chart_base_url = %config.chart_base_url,
        cache_ttl_secs = config.cache_ttl_secs,
        "configuration resolved"
    );

    // ── 2. Build shared state & serve ────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, CONFIG_PATH));
    let app = api::rest::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "HTTP server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
