//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams committed ledger events to
//! clients subscribed by team and answers leaderboard requests.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
