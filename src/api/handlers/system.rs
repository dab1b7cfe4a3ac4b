//! System endpoints: health check and player catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::CatalogPlayer;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    ws_subscribers: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and the number of live event subscribers.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ws_subscribers: state.event_bus.receiver_count(),
        }),
    )
}

/// `GET /config/players` — List the biddable players.
#[utoipa::path(
    get,
    path = "/config/players",
    tag = "System",
    summary = "Player catalog",
    description = "Returns the catalog used to resolve bid points when a bid omits them.",
    responses(
        (status = 200, description = "Player catalog", body = Vec<CatalogPlayer>),
    )
)]
pub async fn players_handler(State(state): State<AppState>) -> impl IntoResponse {
    let players: Vec<CatalogPlayer> = state.league_service.catalog().players().to_vec();
    (StatusCode::OK, Json(players))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/players", get(players_handler))
}
