//! Domain layer: core types, the transfer core, and the event system.
//!
//! This module contains the server-side domain model: team identity and
//! records, the append-only audit records, the pure trade/bid transfer
//! logic, rupee formatting, the player catalog, and the event bus for
//! broadcasting committed changes.

pub mod audit;
pub mod catalog;
pub mod event_bus;
pub mod ledger_event;
pub mod money;
pub mod team;
pub mod team_id;
pub mod transfer;

pub use audit::{AuditKind, AuditQuery, AuditRecord, BidRecord, SortOrder, TradeRecord};
pub use catalog::{CatalogError, CatalogPlayer, PlayerCatalog};
pub use event_bus::EventBus;
pub use ledger_event::LedgerEvent;
pub use money::format_inr;
pub use team::{DEFAULT_TEAM_CASH, RosterEntry, TeamRecord};
pub use team_id::TeamId;
pub use transfer::{SettledTrade, ValidatedTrade, apply_bid, apply_trade, validate_trade};
