//! Service layer: business logic orchestration.
//!
//! [`LeagueService`] coordinates team, bid and trade operations, runs the
//! transfer core inside the store's atomic primitive, appends audit records
//! and emits events through the [`super::domain::EventBus`].

pub mod league_service;

pub use league_service::{
    BidReceipt, DEFAULT_TRADE_LOG_LIMIT, LeagueService, Standing, TeamUpdate, TradeReceipt,
};
