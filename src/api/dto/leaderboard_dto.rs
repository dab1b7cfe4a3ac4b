//! Leaderboard DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use super::bid_dto::BidEntryDto;
use crate::domain::TeamId;
use crate::domain::money::format_inr_u64;
use crate::service::Standing;

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingDto {
    /// 1-based rank.
    pub rank: usize,
    /// Team identifier.
    pub team_id: TeamId,
    /// Team name.
    pub name: String,
    /// Points total.
    pub points: i64,
    /// Remaining purse in rupees.
    pub cash: u64,
    /// Formatted purse.
    pub cash_display: String,
    /// Number of players on the roster.
    pub roster_size: usize,
    /// Auction wins, most recent first.
    pub bids: Vec<BidEntryDto>,
}

impl From<Standing> for StandingDto {
    fn from(standing: Standing) -> Self {
        let team = standing.team;
        Self {
            rank: standing.rank,
            team_id: team.id,
            cash_display: format_inr_u64(team.cash),
            roster_size: team.roster.len(),
            name: team.name,
            points: team.points,
            cash: team.cash,
            bids: standing.bids.into_iter().map(BidEntryDto::from).collect(),
        }
    }
}

/// Response body for `GET /leaderboard`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Standings ordered by rank.
    pub data: Vec<StandingDto>,
}
