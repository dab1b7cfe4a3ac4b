//! Shared helpers: spawn the service on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use auction_ledger::api;
use auction_ledger::app_state::AppState;
use auction_ledger::domain::{CatalogPlayer, EventBus, PlayerCatalog};
use auction_ledger::persistence::{MemoryStore, Persistence};
use auction_ledger::service::LeagueService;

/// Starts the full application on `127.0.0.1:0` and returns its address.
pub async fn spawn_app() -> std::net::SocketAddr {
    let store = Arc::new(MemoryStore::new());
    let catalog = PlayerCatalog::new(vec![
        CatalogPlayer {
            name: "Player X".to_string(),
            points: 50,
        },
        CatalogPlayer {
            name: "Player Y".to_string(),
            points: 30,
        },
    ]);
    let service = LeagueService::new(
        Persistence::Memory(Arc::clone(&store)),
        Persistence::Memory(store),
        EventBus::new(64),
    )
    .with_catalog(catalog);
    let app = api::build_app(AppState::new(service), Duration::from_secs(5));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
