//! auction-ledger server entry point.
//!
//! Loads configuration, selects the store backend and starts the Axum HTTP
//! server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use auction_ledger::api;
use auction_ledger::app_state::AppState;
use auction_ledger::config::{LeagueConfig, LogFormat, StoreBackend};
use auction_ledger::domain::{EventBus, PlayerCatalog};
use auction_ledger::persistence::{MemoryStore, Persistence, PostgresStore};
use auction_ledger::service::LeagueService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = LeagueConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting auction-ledger");

    // Build persistence layer
    let persistence = match config.store_backend {
        StoreBackend::Memory => Persistence::Memory(Arc::new(MemoryStore::new())),
        StoreBackend::Postgres => Persistence::Postgres(
            PostgresStore::connect(&config)
                .await
                .context("connecting to postgres")?,
        ),
    };
    tracing::info!(backend = persistence.backend_name(), "store ready");

    let catalog = match &config.player_catalog_path {
        Some(path) => PlayerCatalog::from_json_file(path)
            .with_context(|| format!("loading player catalog from {}", path.display()))?,
        None => PlayerCatalog::default(),
    };
    tracing::info!(players = catalog.len(), "player catalog loaded");

    // Build service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let league_service = LeagueService::new(persistence.clone(), persistence, event_bus)
        .with_catalog(catalog)
        .with_default_cash(config.default_team_cash)
        .with_trade_log_limit(config.trade_log_limit);

    // Build router
    let app = api::build_app(
        AppState::new(league_service),
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
