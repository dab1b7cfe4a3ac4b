//! Ledger error types with HTTP status code mapping.
//!
//! [`LedgerError`] is the central error type for the service. Validation
//! failures from the transfer core, store failures and API-level request
//! errors all flow through it, and each variant maps to a numeric code and
//! an HTTP status in the structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::TeamId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1004,
///     "message": "Mumbai Mavericks does not have enough cash for this trade",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`LedgerError`] code ranges).
    pub code: u32,
    /// Human-readable reason the operation was rejected.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Every reason a ledger operation can be rejected.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Trade / bid rules | 400 Bad Request / 422        |
/// | 2000–2999 | State / Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / Store    | 500 / 503                    |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Seller and buyer are the same team.
    #[error("a team cannot trade with itself")]
    SelfTrade,

    /// The amount is not a valid non-negative (trade) or positive (bid)
    /// integer. Carries the rejected input as sent.
    #[error("invalid amount {0}: must be a valid, non-negative integer")]
    InvalidAmount(String),

    /// The paying team does not hold enough cash.
    #[error("{team} does not have enough cash: available {available}, required {required}")]
    InsufficientFunds {
        /// Name of the paying team.
        team: String,
        /// Cash the team currently holds.
        available: u64,
        /// Cash the operation needs.
        required: u64,
    },

    /// The player is not on the selling team's roster.
    #[error("{player} not found in the roster of {team}")]
    PlayerNotFound {
        /// Name of the selling team.
        team: String,
        /// Requested player name.
        player: String,
    },

    /// No bid record names the player, so ownership cannot be established.
    #[error("ownership of {player} could not be verified in auction logs; trade is denied")]
    UnverifiedOwnership {
        /// Requested player name.
        player: String,
    },

    /// The seller is not the team that won the player at auction.
    #[error(
        "{seller} is not the original owner; {owner} bought {player} in the auction and only they can trade this player for cash"
    )]
    NotOriginalOwner {
        /// Requested player name.
        player: String,
        /// Team that attempted the sale.
        seller: String,
        /// Team named by the auction bid record.
        owner: String,
    },

    /// A concurrent transaction changed a record between read and commit.
    #[error("transaction conflict: team records changed concurrently, please retry")]
    Conflict,

    /// The backing store could not be reached or failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Team with the given ID was not found.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    /// Request validation failed outside the transfer rules.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1000,
            Self::SelfTrade => 1001,
            Self::InvalidAmount(_) => 1002,
            Self::PlayerNotFound { .. } => 1003,
            Self::InsufficientFunds { .. } => 1004,
            Self::UnverifiedOwnership { .. } => 1005,
            Self::NotOriginalOwner { .. } => 1006,
            Self::TeamNotFound(_) => 2001,
            Self::Conflict => 2002,
            Self::Internal(_) => 3000,
            Self::StoreUnavailable(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::SelfTrade | Self::InvalidAmount(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PlayerNotFound { .. }
            | Self::InsufficientFunds { .. }
            | Self::UnverifiedOwnership { .. }
            | Self::NotOriginalOwner { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TeamNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns `true` for rejections decided by the trade and bid rules,
    /// which are final for the attempted operation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SelfTrade
                | Self::InvalidAmount(_)
                | Self::InsufficientFunds { .. }
                | Self::PlayerNotFound { .. }
                | Self::UnverifiedOwnership { .. }
                | Self::NotOriginalOwner { .. }
        )
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        let errors = [
            LedgerError::SelfTrade,
            LedgerError::InvalidAmount("-1".to_string()),
            LedgerError::UnverifiedOwnership {
                player: "X".to_string(),
            },
        ];
        for err in errors {
            assert!(err.is_validation());
            assert!(err.status_code().is_client_error());
        }
    }

    #[test]
    fn conflict_maps_to_409() {
        assert_eq!(LedgerError::Conflict.status_code(), StatusCode::CONFLICT);
        assert!(!LedgerError::Conflict.is_validation());
    }

    #[test]
    fn not_original_owner_message_names_auction_winner() {
        let err = LedgerError::NotOriginalOwner {
            player: "Player X".to_string(),
            seller: "Team B".to_string(),
            owner: "Team A".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Team B is not the original owner"));
        assert!(msg.contains("Team A bought Player X"));
    }

    #[test]
    fn store_errors_are_unavailable() {
        let err = LedgerError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), 3001);
    }
}
