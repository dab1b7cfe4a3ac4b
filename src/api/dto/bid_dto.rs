//! Bid DTOs for placing bids and reading the bid log.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::AmountInput;
use super::team_dto::TeamResponse;
use crate::domain::money::format_inr_u64;
use crate::domain::{BidRecord, TeamId};
use crate::service::BidReceipt;

/// Request body for `POST /bids`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceBidRequest {
    /// Winning team.
    pub team_id: TeamId,
    /// Player won at auction.
    pub player_name: String,
    /// Winning bid in rupees; must be positive.
    pub amount: AmountInput,
    /// Player points. Looked up in the catalog when omitted.
    #[serde(default)]
    pub points: Option<i64>,
}

/// A bid record with its amount formatted for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BidEntryDto {
    /// The audit record.
    #[serde(flatten)]
    pub record: BidRecord,
    /// Formatted bid amount.
    pub amount_display: String,
}

impl From<BidRecord> for BidEntryDto {
    fn from(record: BidRecord) -> Self {
        Self {
            amount_display: format_inr_u64(record.amount),
            record,
        }
    }
}

/// Response body for `POST /bids` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct BidResponse {
    /// Winning team after the bid.
    pub team: TeamResponse,
    /// The recorded bid.
    pub bid: BidEntryDto,
    /// Present when the bid committed but could not be written to the
    /// audit log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_error: Option<String>,
}

impl From<BidReceipt> for BidResponse {
    fn from(receipt: BidReceipt) -> Self {
        Self {
            team: receipt.team.into(),
            bid: receipt.record.into(),
            audit_error: receipt.audit_error,
        }
    }
}

/// Response body for `GET /bids`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BidLogResponse {
    /// Matching bids, ordered as requested.
    pub data: Vec<BidEntryDto>,
}
