//! Team DTOs for registration, edits and lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::money::format_inr_u64;
use crate::domain::{RosterEntry, TeamId, TeamRecord, format_inr};

/// Request body for `POST /teams`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    /// Unique team name.
    pub name: String,
    /// Starting purse in rupees. Defaults to the configured purse.
    #[serde(default)]
    pub cash: Option<u64>,
}

/// Request body for `PATCH /teams/{id}`. Omitted fields are unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTeamRequest {
    /// New unique name.
    #[serde(default)]
    pub name: Option<String>,
    /// New cash balance; must be non-negative.
    #[serde(default)]
    pub cash: Option<i64>,
    /// New points total.
    #[serde(default)]
    pub points: Option<i64>,
}

/// A roster entry with its purchase price formatted for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterEntryDto {
    /// Player name.
    pub name: String,
    /// Purchase amount in rupees.
    pub amount: u64,
    /// Formatted purchase amount.
    pub amount_display: String,
    /// Fantasy points.
    pub points: i64,
}

impl From<RosterEntry> for RosterEntryDto {
    fn from(entry: RosterEntry) -> Self {
        Self {
            amount_display: format_inr_u64(entry.amount),
            name: entry.name,
            amount: entry.amount,
            points: entry.points,
        }
    }
}

/// Full team state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamResponse {
    /// Team identifier.
    pub team_id: TeamId,
    /// Team name.
    pub name: String,
    /// Remaining purse in rupees.
    pub cash: u64,
    /// Formatted purse.
    pub cash_display: String,
    /// Points total.
    pub points: i64,
    /// Owned players in acquisition order.
    pub roster: Vec<RosterEntryDto>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<TeamRecord> for TeamResponse {
    fn from(team: TeamRecord) -> Self {
        Self {
            team_id: team.id,
            cash_display: format_inr_u64(team.cash),
            name: team.name,
            cash: team.cash,
            points: team.points,
            roster: team.roster.into_iter().map(RosterEntryDto::from).collect(),
            created_at: team.created_at,
        }
    }
}

/// Paginated list response for `GET /teams`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamListResponse {
    /// Teams on this page, ordered by name.
    pub data: Vec<TeamResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
    /// Sum of all teams' purses, formatted.
    pub total_cash_display: String,
}

/// Formats the sum of `cash` values, saturating on overflow.
#[must_use]
pub fn total_cash_display(teams: &[TeamRecord]) -> String {
    let total = teams
        .iter()
        .fold(0_i64, |acc, t| acc.saturating_add(i64::try_from(t.cash).unwrap_or(i64::MAX)));
    format_inr(total)
}
