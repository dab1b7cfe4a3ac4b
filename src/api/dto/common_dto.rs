//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::LedgerError;

/// A rupee amount as sent by a client: a JSON integer or a numeric string.
///
/// Form inputs arrive as text; the API layer turns them into the integers
/// the ledger works with. Any other JSON value is kept so it can be
/// rejected as an invalid amount instead of a malformed body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AmountInput {
    /// Integer amount.
    Number(i64),
    /// Decimal digits, optionally signed and surrounded by whitespace.
    Text(String),
    /// Fractional numbers, booleans, objects and anything else.
    Other(serde_json::Value),
}

impl AmountInput {
    /// Parses the input into an integer amount. Sign checks are left to the
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if the input is not an integer.
    pub fn parse(&self) -> Result<i64, LedgerError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| LedgerError::InvalidAmount(format!("{raw:?}"))),
            Self::Other(value) => Err(LedgerError::InvalidAmount(value.to_string())),
        }
    }
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Returns the requested page of `items` plus its metadata.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let params = self.clamped();
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(params.per_page);
        let start = params.page.saturating_sub(1).saturating_mul(params.per_page);
        let data = items
            .into_iter()
            .skip(usize::try_from(start).unwrap_or(usize::MAX))
            .take(usize::try_from(params.per_page).unwrap_or(usize::MAX))
            .collect();
        let meta = PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
        };
        (data, meta)
    }
}

/// Optional `limit` query parameter.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Maximum number of entries returned.
    #[serde(default)]
    pub limit: Option<usize>,
}
