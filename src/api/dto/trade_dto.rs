//! Trade DTOs for executing trades and reading the trade log.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::AmountInput;
use super::team_dto::TeamResponse;
use crate::domain::money::format_inr_u64;
use crate::domain::{TeamId, TradeRecord};
use crate::service::TradeReceipt;

/// Request body for `POST /trades`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TradeRequest {
    /// Selling team; must be the player's auction winner.
    pub from_team_id: TeamId,
    /// Buying team.
    pub to_team_id: TeamId,
    /// Player to sell.
    pub player: String,
    /// Cash paid by the buyer; must be non-negative.
    pub amount: AmountInput,
}

/// A trade record with its amount formatted for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TradeEntryDto {
    /// The audit record.
    #[serde(flatten)]
    pub record: TradeRecord,
    /// Formatted trade amount.
    pub amount_display: String,
}

impl From<TradeRecord> for TradeEntryDto {
    fn from(record: TradeRecord) -> Self {
        Self {
            amount_display: format_inr_u64(record.amount),
            record,
        }
    }
}

/// Response body for `POST /trades` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct TradeResponse {
    /// Seller after the trade.
    pub seller: TeamResponse,
    /// Buyer after the trade.
    pub buyer: TeamResponse,
    /// The recorded trade.
    pub trade: TradeEntryDto,
    /// Present when the trade committed but could not be written to the
    /// audit log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_error: Option<String>,
}

impl From<TradeReceipt> for TradeResponse {
    fn from(receipt: TradeReceipt) -> Self {
        Self {
            seller: receipt.seller.into(),
            buyer: receipt.buyer.into(),
            trade: receipt.record.into(),
            audit_error: receipt.audit_error,
        }
    }
}

/// Response body for `GET /trades`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TradeLogResponse {
    /// Most recent trades first.
    pub data: Vec<TradeEntryDto>,
}
