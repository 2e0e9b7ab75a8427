mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod profile;
mod rate_limit;
mod report;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{ChatModel, LlmClient};
use crate::rate_limit::{MemoryRateLimiter, RateLimiter, RedisRateLimiter};
use crate::routes::build_router;
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerPath API v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {config:?}");

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.llm.clone())?;
    info!("LLM client initialized (model: {})", llm.model_id());

    // Initialize rate limiter; the in-memory backend owns a sweeper task
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut sweeper = None;
    let limiter: Arc<dyn RateLimiter> = match &config.redis_url {
        Some(url) => Arc::new(RedisRateLimiter::connect(url, config.rate_limit).await?),
        None => {
            let memory = Arc::new(MemoryRateLimiter::new(config.rate_limit));
            sweeper = Some(memory.clone().spawn_sweeper(SWEEP_INTERVAL, shutdown_rx));
            info!("Using in-memory rate limiter");
            memory
        }
    };
    info!(
        "Rate limit: {} reports per {}s",
        config.rate_limit.max_requests,
        config.rate_limit.window.as_secs()
    );

    // Build app state
    let state = AppState {
        db,
        llm: Arc::new(llm),
        limiter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to APP_URL once the frontend origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop background work owned by this process; only the in-memory limiter has any
    if let Some(handle) = sweeper {
        shutdown_tx.send_replace(true);
        if let Err(e) = handle.await {
            warn!("Rate limiter sweeper ended abnormally: {e}");
        }
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
