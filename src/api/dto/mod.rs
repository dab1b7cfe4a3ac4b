//! Data Transfer Objects for REST request/response serialization.
//!
//! Cash values are exchanged as integer rupees. Responses also carry a
//! `*_display` string rendered with [`crate::domain::format_inr`].

pub mod bid_dto;
pub mod common_dto;
pub mod leaderboard_dto;
pub mod team_dto;
pub mod trade_dto;

pub use bid_dto::*;
pub use common_dto::*;
pub use leaderboard_dto::*;
pub use team_dto::*;
pub use trade_dto::*;
