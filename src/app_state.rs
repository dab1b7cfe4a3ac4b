//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::LeagueService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// League service for all business logic.
    pub league_service: Arc<LeagueService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps a service, sharing its event bus with the WebSocket layer.
    #[must_use]
    pub fn new(league_service: LeagueService) -> Self {
        let event_bus = league_service.event_bus().clone();
        Self {
            league_service: Arc::new(league_service),
            event_bus,
        }
    }
}
