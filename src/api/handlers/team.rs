//! Team handlers: register, list, get, edit, remove.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateTeamRequest, PaginationParams, TeamListResponse, TeamResponse, UpdateTeamRequest,
    total_cash_display,
};
use crate::app_state::AppState;
use crate::domain::TeamId;
use crate::error::{ErrorResponse, LedgerError};
use crate::service::TeamUpdate;

/// `POST /teams` — Register a new team.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidRequest`] for a blank or duplicate name.
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    tag = "Teams",
    summary = "Register a team",
    description = "Creates a team with an empty roster and zero points. Cash defaults to the configured purse.",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team registered", body = TeamResponse),
        (status = 400, description = "Blank or duplicate name", body = ErrorResponse),
    )
)]
pub async fn create_team(
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let team = state
        .league_service
        .register_team(&req.name, req.cash)
        .await?;
    Ok((StatusCode::CREATED, Json(TeamResponse::from(team))))
}

/// `GET /teams` — List teams ordered by name.
///
/// # Errors
///
/// Returns [`LedgerError::StoreUnavailable`] on backend failure.
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    tag = "Teams",
    summary = "List teams",
    description = "Returns a paginated list of all teams ordered by name, plus the formatted total purse.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated team list", body = TeamListResponse),
    )
)]
pub async fn list_teams(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, LedgerError> {
    let teams = state.league_service.list_teams().await?;
    let total_cash_display = total_cash_display(&teams);
    let (page, pagination) = params.paginate(teams);

    Ok(Json(TeamListResponse {
        data: page.into_iter().map(TeamResponse::from).collect(),
        pagination,
        total_cash_display,
    }))
}

/// `GET /teams/{id}` — Get one team.
///
/// # Errors
///
/// Returns [`LedgerError::TeamNotFound`] if the team does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    summary = "Get team details",
    params(
        ("id" = uuid::Uuid, Path, description = "Team UUID"),
    ),
    responses(
        (status = 200, description = "Team details", body = TeamResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
    )
)]
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LedgerError> {
    let team = state
        .league_service
        .get_team(TeamId::from_uuid(id))
        .await?;
    Ok(Json(TeamResponse::from(team)))
}

/// `PATCH /teams/{id}` — Administrative edit of name, cash or points.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for negative cash,
/// [`LedgerError::InvalidRequest`] for a blank or duplicate name and
/// [`LedgerError::TeamNotFound`] if the team does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    summary = "Edit a team",
    description = "Overwrites the given fields. Points may be set independently of the roster.",
    params(
        ("id" = uuid::Uuid, Path, description = "Team UUID"),
    ),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team after the edit", body = TeamResponse),
        (status = 400, description = "Invalid edit", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
    )
)]
pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let update = TeamUpdate {
        name: req.name,
        cash: req.cash,
        points: req.points,
    };
    let team = state
        .league_service
        .update_team(TeamId::from_uuid(id), update)
        .await?;
    Ok(Json(TeamResponse::from(team)))
}

/// `DELETE /teams/{id}` — Remove a team.
///
/// # Errors
///
/// Returns [`LedgerError::TeamNotFound`] if the team does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    summary = "Delete a team",
    description = "Removes a team and emits a team_removed event. Audit records are kept.",
    params(
        ("id" = uuid::Uuid, Path, description = "Team UUID"),
    ),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 404, description = "Team not found", body = ErrorResponse),
    )
)]
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, LedgerError> {
    state
        .league_service
        .remove_team(TeamId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Team management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", post(create_team).get(list_teams))
        .route(
            "/teams/{id}",
            get(get_team).patch(update_team).delete(delete_team),
        )
}
