//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; health and catalog
//! endpoints live at the root. With the `swagger-ui` feature the OpenAPI
//! document is served at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "auction-ledger",
        description = "Auction, trade and leaderboard ledger for a fantasy cricket league"
    ),
    paths(
        handlers::team::create_team,
        handlers::team::list_teams,
        handlers::team::get_team,
        handlers::team::update_team,
        handlers::team::delete_team,
        handlers::bid::place_bid,
        handlers::bid::list_bids,
        handlers::trade::execute_trade,
        handlers::trade::list_trades,
        handlers::leaderboard::leaderboard,
        handlers::system::health_handler,
        handlers::system::players_handler,
    ),
    tags(
        (name = "Teams", description = "Team registration and administration"),
        (name = "Bids", description = "Auction wins and the bid log"),
        (name = "Trades", description = "Player-for-cash trades between teams"),
        (name = "Leaderboard", description = "Live standings"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

/// Builds the full application: REST routes, `/ws`, and the HTTP
/// middleware stack (tracing, CORS, per-request timeout).
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    build_router()
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_ledger_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/trades"));
        assert!(doc.paths.paths.contains_key("/api/v1/teams/{id}"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
