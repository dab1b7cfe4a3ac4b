//! # auction-ledger
//!
//! REST API and WebSocket service for a fantasy cricket league auction:
//! team registration, auction bids, player-for-cash trades between teams
//! and a live leaderboard.
//!
//! The core is the trade validation and two-party balance transfer in
//! [`domain::transfer`]. It checks ownership against the append-only bid
//! log and conserves cash and points across both teams. Everything else is
//! a thin layer around it.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── LeagueService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Transfer core (domain/transfer)
//!     │
//!     └── Persistence: TeamStore + AuditLog
//!             ├── MemoryStore
//!             └── PostgresStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
