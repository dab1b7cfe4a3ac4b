//! Immutable audit records: auction bids and completed trades.
//!
//! The audit log is append-only. Bid records are the sole source of
//! trade eligibility: the team named by the most recent bid record for a
//! player is the only team that may sell that player for cash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Created once per successful auction bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BidRecord {
    /// Name of the winning team.
    pub team_name: String,
    /// Player won at auction.
    pub player_name: String,
    /// Winning bid in rupees.
    pub amount: u64,
    /// Commit timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Created once per committed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TradeRecord {
    /// Name of the selling team.
    pub from_team: String,
    /// Name of the buying team.
    pub to_team: String,
    /// Player that changed hands.
    pub player: String,
    /// Cash paid by the buyer, in rupees.
    pub amount: u64,
    /// Points moved from seller to buyer.
    pub points: i64,
    /// Commit timestamp.
    pub timestamp: DateTime<Utc>,
}

/// A single audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    /// Auction bid.
    Bid(BidRecord),
    /// Completed trade.
    Trade(TradeRecord),
}

impl AuditRecord {
    /// Returns the commit timestamp of the record.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Bid(bid) => bid.timestamp,
            Self::Trade(trade) => trade.timestamp,
        }
    }

    /// Returns the record kind.
    #[must_use]
    pub const fn kind(&self) -> AuditKind {
        match self {
            Self::Bid(_) => AuditKind::Bid,
            Self::Trade(_) => AuditKind::Trade,
        }
    }

    /// Returns `true` if the record involves the named team.
    #[must_use]
    pub fn involves_team(&self, team_name: &str) -> bool {
        match self {
            Self::Bid(bid) => bid.team_name == team_name,
            Self::Trade(trade) => trade.from_team == team_name || trade.to_team == team_name,
        }
    }

    /// Returns the player the record is about.
    #[must_use]
    pub fn player(&self) -> &str {
        match self {
            Self::Bid(bid) => &bid.player_name,
            Self::Trade(trade) => &trade.player,
        }
    }
}

impl From<BidRecord> for AuditRecord {
    fn from(bid: BidRecord) -> Self {
        Self::Bid(bid)
    }
}

impl From<TradeRecord> for AuditRecord {
    fn from(trade: TradeRecord) -> Self {
        Self::Trade(trade)
    }
}

/// Audit record discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// Auction bid records.
    Bid,
    /// Trade records.
    Trade,
}

/// Sort direction by commit timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
}

/// Filter, order and limit for [`crate::persistence::AuditLog::query_all`].
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    /// Restrict to one record kind.
    #[serde(default)]
    pub kind: Option<AuditKind>,
    /// Restrict to records involving this team name.
    #[serde(default)]
    pub team: Option<String>,
    /// Restrict to records about this player.
    #[serde(default)]
    pub player: Option<String>,
    /// Timestamp order. Defaults to newest first.
    #[serde(default)]
    pub order: SortOrder,
    /// Maximum number of records returned.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl AuditQuery {
    /// Returns `true` if the record passes the kind, team and player filters.
    #[must_use]
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(kind) = self.kind
            && record.kind() != kind
        {
            return false;
        }
        if let Some(team) = self.team.as_deref()
            && !record.involves_team(team)
        {
            return false;
        }
        if let Some(player) = self.player.as_deref()
            && record.player() != player
        {
            return false;
        }
        true
    }

    /// Sorts filtered records by timestamp and applies the limit.
    ///
    /// `records` must be in append order; the sort is stable, so records
    /// sharing a timestamp keep their insertion order (reversed for
    /// [`SortOrder::Newest`]).
    #[must_use]
    pub fn arrange(&self, mut records: Vec<AuditRecord>) -> Vec<AuditRecord> {
        if self.order == SortOrder::Newest {
            records.reverse();
            records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        } else {
            records.sort_by_key(AuditRecord::timestamp);
        }
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }
}
