//! Trade handlers: execute a player-for-cash trade, read the trade log.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{LimitParams, TradeEntryDto, TradeLogResponse, TradeRequest, TradeResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /trades` — Sell a player to another team for cash.
///
/// # Errors
///
/// Returns the first failed trade rule (see [`LedgerError`] codes
/// 1001–1006), [`LedgerError::TeamNotFound`], or [`LedgerError::Conflict`]
/// if the records kept changing underneath the trade.
#[utoipa::path(
    post,
    path = "/api/v1/trades",
    tag = "Trades",
    summary = "Execute a trade",
    description = "Moves the player from seller to buyer against cash. Only the team that won the player at auction may sell it. Cash and points are conserved across both teams.",
    request_body = TradeRequest,
    responses(
        (status = 201, description = "Trade committed", body = TradeResponse),
        (status = 400, description = "Self-trade or invalid amount", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 422, description = "Trade rule violated", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn execute_trade(
    State(state): State<AppState>,
    Json(req): Json<TradeRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    // Self-trade outranks every other field check, the amount included.
    if req.from_team_id == req.to_team_id {
        return Err(LedgerError::SelfTrade);
    }
    let amount = req.amount.parse()?;
    let receipt = state
        .league_service
        .execute_trade(req.from_team_id, req.to_team_id, &req.player, amount)
        .await?;
    Ok((StatusCode::CREATED, Json(TradeResponse::from(receipt))))
}

/// `GET /trades` — Most recent trades.
///
/// # Errors
///
/// Returns [`LedgerError::StoreUnavailable`] on backend failure.
#[utoipa::path(
    get,
    path = "/api/v1/trades",
    tag = "Trades",
    summary = "Recent trades",
    description = "Returns trade records, newest first. `limit` defaults to the configured trade log length.",
    params(LimitParams),
    responses(
        (status = 200, description = "Recent trades", body = TradeLogResponse),
    )
)]
pub async fn list_trades(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, LedgerError> {
    let trades = state.league_service.recent_trades(params.limit).await?;
    Ok(Json(TradeLogResponse {
        data: trades.into_iter().map(TradeEntryDto::from).collect(),
    }))
}

/// Trade routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/trades", post(execute_trade).get(list_trades))
}
