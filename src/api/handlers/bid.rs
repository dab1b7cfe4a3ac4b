//! Bid handlers: record an auction win, read the bid log.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{BidEntryDto, BidLogResponse, BidResponse, PlaceBidRequest};
use crate::app_state::AppState;
use crate::domain::AuditQuery;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /bids` — Record an auction win.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] unless the amount is a positive
/// integer,
/// [`LedgerError::InsufficientFunds`] if it exceeds the team's cash, and
/// [`LedgerError::TeamNotFound`] for an unknown team.
#[utoipa::path(
    post,
    path = "/api/v1/bids",
    tag = "Bids",
    summary = "Place a winning bid",
    description = "Debits the bid from the team, adds the player to its roster and appends a bid record. That record establishes the team as the player's original owner.",
    request_body = PlaceBidRequest,
    responses(
        (status = 201, description = "Bid committed", body = BidResponse),
        (status = 400, description = "Invalid amount or player", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn place_bid(
    State(state): State<AppState>,
    Json(req): Json<PlaceBidRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let amount = req.amount.parse()?;
    let receipt = state
        .league_service
        .place_bid(req.team_id, &req.player_name, amount, req.points)
        .await?;
    Ok((StatusCode::CREATED, Json(BidResponse::from(receipt))))
}

/// `GET /bids` — Bid log filtered by team and/or player.
///
/// # Errors
///
/// Returns [`LedgerError::StoreUnavailable`] on backend failure.
#[utoipa::path(
    get,
    path = "/api/v1/bids",
    tag = "Bids",
    summary = "Bid log",
    description = "Returns bid records, newest first unless `order=oldest`. The `kind` filter is ignored.",
    params(AuditQuery),
    responses(
        (status = 200, description = "Matching bid records", body = BidLogResponse),
    )
)]
pub async fn list_bids(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    let bids = state.league_service.bid_log(query).await?;
    Ok(Json(BidLogResponse {
        data: bids.into_iter().map(BidEntryDto::from).collect(),
    }))
}

/// Bid routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/bids", post(place_bid).get(list_bids))
}
