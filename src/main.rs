// =============================================================================
// StockScope — Main Entry Point
// =============================================================================
//
// Loads configuration, builds the shared state and serves the REST API until
// Ctrl+C.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stockscope::api::rest;
use stockscope::app_state::AppState;
use stockscope::runtime_config::AppConfig;

const DEFAULT_CONFIG_PATH: &str = "stockscope_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("StockScope starting up");

    let config_path =
        std::env::var("STOCKSCOPE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = AppConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    config.apply_overrides(|key| std::env::var(key).ok());

    info!(
        symbols = ?config.popular_symbols,
        default_period = %config.default_period,
        provider = %config.provider_base_url,
        "Configuration ready"
    );

    // ── 2. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, &config_path)?);

    // ── 3. Serve ─────────────────────────────────────────────────────────
    let app = rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("server error")?;

    info!("StockScope stopped");
    Ok(())
}
