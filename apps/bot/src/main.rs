mod config;
mod conversation;
mod db;
mod errors;
mod generation;
mod llm_client;
mod profiles;
mod routes;
mod telegram;
mod transport;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::Engine;
use crate::db::{create_pool, init_schema};
use crate::llm_client::GenerationClient;
use crate::routes::build_router;
use crate::telegram::{run_polling, TelegramClient};

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

    info!("Starting vacancy-reply bot v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite and the profile schema
    let pool = create_pool(&config.database_url).await?;
    init_schema(&pool)
        .await
        .context("Database schema initialization failed")?;

    // Telegram transport
    let telegram = Arc::new(TelegramClient::new(&config.tg_token));
    if let Err(e) = telegram.set_my_commands().await {
        warn!("Failed to register bot commands: {e}");
    }

    // Generation client
    let generator = Arc::new(GenerationClient::new(config.ai_api_key.clone()));
    info!(
        "Generation client initialized (model: {})",
        llm_client::AI_MODEL
    );

    // Conversation engine
    let engine = Arc::new(Engine::new(pool, generator, telegram.clone()));

    // Liveness endpoint for the hosting platform's health probe
    let app = build_router().layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Health server listening on {addr}");

    // Serve the probe and poll Telegram concurrently; either one
    // failing takes the process down.
    tokio::try_join!(
        async {
            axum::serve(listener, app)
                .await
                .context("Health server failed")
        },
        run_polling(telegram, engine),
    )?;

    Ok(())
}
