//! Leaderboard handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{LeaderboardResponse, StandingDto};
use crate::app_state::AppState;
use crate::error::LedgerError;

/// `GET /leaderboard` — Teams ranked by points.
///
/// # Errors
///
/// Returns [`LedgerError::StoreUnavailable`] on backend failure.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "Leaderboard",
    summary = "Leaderboard",
    description = "Ranks teams by points, then cash, then name. Each row carries the team's auction wins.",
    responses(
        (status = 200, description = "Current standings", body = LeaderboardResponse),
    )
)]
pub async fn leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, LedgerError> {
    let standings = state.league_service.leaderboard().await?;
    Ok(Json(LeaderboardResponse {
        data: standings.into_iter().map(StandingDto::from).collect(),
    }))
}

/// Leaderboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard))
}
