//! Domain events reflecting committed ledger mutations.
//!
//! Every committed change emits a [`LedgerEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers so the
//! leaderboard can refresh live.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::TeamId;
use super::audit::{BidRecord, TradeRecord};

/// Domain event emitted after every committed mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Emitted when a team is registered.
    TeamRegistered {
        /// Team identifier.
        team_id: TeamId,
        /// Team name.
        name: String,
        /// Starting purse.
        cash: u64,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after an administrative edit.
    TeamUpdated {
        /// Team identifier.
        team_id: TeamId,
        /// Name after the edit.
        name: String,
        /// Cash after the edit.
        cash: u64,
        /// Points after the edit.
        points: i64,
        /// Edit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a team is removed.
    TeamRemoved {
        /// Team identifier.
        team_id: TeamId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a bid commits.
    BidPlaced {
        /// Winning team.
        team_id: TeamId,
        /// Team cash after the bid.
        cash_after: u64,
        /// Team points after the bid.
        points_after: i64,
        /// The bid audit record.
        bid: BidRecord,
    },

    /// Emitted after a trade commits.
    TradeCompleted {
        /// Selling team.
        seller_id: TeamId,
        /// Buying team.
        buyer_id: TeamId,
        /// The trade audit record.
        trade: TradeRecord,
    },
}

impl LedgerEvent {
    /// Returns every team the event touches.
    #[must_use]
    pub fn team_ids(&self) -> Vec<TeamId> {
        match self {
            Self::TeamRegistered { team_id, .. }
            | Self::TeamUpdated { team_id, .. }
            | Self::TeamRemoved { team_id, .. }
            | Self::BidPlaced { team_id, .. } => vec![*team_id],
            Self::TradeCompleted {
                seller_id,
                buyer_id,
                ..
            } => vec![*seller_id, *buyer_id],
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::TeamRegistered { .. } => "team_registered",
            Self::TeamUpdated { .. } => "team_updated",
            Self::TeamRemoved { .. } => "team_removed",
            Self::BidPlaced { .. } => "bid_placed",
            Self::TradeCompleted { .. } => "trade_completed",
        }
    }
}
