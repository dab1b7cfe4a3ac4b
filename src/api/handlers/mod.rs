//! REST endpoint handlers organized by resource.

pub mod bid;
pub mod leaderboard;
pub mod system;
pub mod team;
pub mod trade;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(team::routes())
        .merge(bid::routes())
        .merge(trade::routes())
        .merge(leaderboard::routes())
}
