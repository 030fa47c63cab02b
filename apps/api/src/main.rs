mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod scoring;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::profile::ScoringProfile;
use crate::state::AppState;
use crate::store::{spawn_periodic_flush, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CVNU API v{}", env!("CARGO_PKG_VERSION"));

    // Load scoring constants for this deployment
    let profile = ScoringProfile::load(config.scoring_profile_path.as_deref())?;

    // Open the file-backed store and start the periodic flush
    let store = Arc::new(Store::load(&config.data_dir).await?);
    let _flush_task = spawn_periodic_flush(
        store.clone(),
        Duration::from_secs(config.flush_interval_secs),
    );

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_temperature,
        config.llm_max_tokens,
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        store: store.clone(),
        llm: Arc::new(llm),
        profile: Arc::new(profile),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // browser front-ends are served from another origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // One final flush so nothing recorded since the last tick is lost.
    store.flush().await?;
    info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}
