//! Trade validation and the two-party balance transfer.
//!
//! These functions are pure: they decide admissibility and compute the
//! post-trade (or post-bid) records, but never touch a store. The service
//! layer runs them inside [`crate::persistence::TeamStore::run_atomic`] so
//! that validation sees the same snapshot the commit is checked against.
//!
//! # Conservation
//!
//! For every settled trade, across the seller/buyer pair:
//!
//! - total cash is unchanged,
//! - total points are unchanged,
//! - exactly one roster entry moves; none is duplicated or lost.

use chrono::Utc;

use super::audit::{BidRecord, TradeRecord};
use super::team::{RosterEntry, TeamRecord};
use super::TeamId;
use crate::error::LedgerError;

/// A trade that passed every admissibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTrade {
    /// Selling team.
    pub seller_id: TeamId,
    /// Buying team.
    pub buyer_id: TeamId,
    /// Roster entry that will move from seller to buyer.
    pub entry: RosterEntry,
    /// Cash the buyer pays, in rupees.
    pub amount: u64,
}

/// Result of [`apply_trade`]: both updated records plus the audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledTrade {
    /// Seller after receiving cash and losing the player.
    pub seller: TeamRecord,
    /// Buyer after paying cash and gaining the player.
    pub buyer: TeamRecord,
    /// The single trade record for this exchange.
    pub record: TradeRecord,
}

/// Checks the parts of a trade that need no store access: distinct teams
/// and a non-negative amount.
///
/// # Errors
///
/// Returns [`LedgerError::SelfTrade`] or [`LedgerError::InvalidAmount`].
pub fn precheck_trade(seller: TeamId, buyer: TeamId, amount: i64) -> Result<u64, LedgerError> {
    if seller == buyer {
        return Err(LedgerError::SelfTrade);
    }
    u64::try_from(amount).map_err(|_| LedgerError::InvalidAmount(amount.to_string()))
}

/// Decides whether `seller` may sell `player_name` to `buyer` for `amount`.
///
/// `bids` is the bid history for the player, most recent first; only the
/// first record naming the player is consulted. The checks run in a fixed
/// order and stop at the first failure.
///
/// # Errors
///
/// In check order: [`LedgerError::SelfTrade`], [`LedgerError::InvalidAmount`],
/// [`LedgerError::InsufficientFunds`], [`LedgerError::PlayerNotFound`],
/// [`LedgerError::UnverifiedOwnership`], [`LedgerError::NotOriginalOwner`].
pub fn validate_trade(
    seller: &TeamRecord,
    buyer: &TeamRecord,
    player_name: &str,
    amount: i64,
    bids: &[BidRecord],
) -> Result<ValidatedTrade, LedgerError> {
    let amount = precheck_trade(seller.id, buyer.id, amount)?;

    if buyer.cash < amount {
        return Err(LedgerError::InsufficientFunds {
            team: buyer.name.clone(),
            available: buyer.cash,
            required: amount,
        });
    }

    let entry = seller
        .find_player(player_name)
        .ok_or_else(|| LedgerError::PlayerNotFound {
            team: seller.name.clone(),
            player: player_name.to_string(),
        })?;

    // Trade rights stay with the auction winner even after the player has
    // been traded on.
    let original = bids
        .iter()
        .find(|bid| bid.player_name == player_name)
        .ok_or_else(|| LedgerError::UnverifiedOwnership {
            player: player_name.to_string(),
        })?;
    if original.team_name != seller.name {
        return Err(LedgerError::NotOriginalOwner {
            player: player_name.to_string(),
            seller: seller.name.clone(),
            owner: original.team_name.clone(),
        });
    }

    Ok(ValidatedTrade {
        seller_id: seller.id,
        buyer_id: buyer.id,
        entry: entry.clone(),
        amount,
    })
}

/// Moves `entry` from `seller` to `buyer` against `amount` of cash.
///
/// # Errors
///
/// Returns [`LedgerError::PlayerNotFound`] if the seller no longer holds the
/// player, [`LedgerError::InsufficientFunds`] if the buyer cannot pay, and
/// [`LedgerError::Internal`] on arithmetic overflow.
pub fn apply_trade(
    mut seller: TeamRecord,
    mut buyer: TeamRecord,
    entry: &RosterEntry,
    amount: u64,
) -> Result<SettledTrade, LedgerError> {
    let moved = seller
        .take_player(&entry.name)
        .ok_or_else(|| LedgerError::PlayerNotFound {
            team: seller.name.clone(),
            player: entry.name.clone(),
        })?;

    buyer.cash = buyer
        .cash
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::InsufficientFunds {
            team: buyer.name.clone(),
            available: buyer.cash,
            required: amount,
        })?;
    seller.cash = seller
        .cash
        .checked_add(amount)
        .ok_or_else(|| overflow("seller cash"))?;

    seller.points = seller
        .points
        .checked_sub(moved.points)
        .ok_or_else(|| overflow("seller points"))?;
    buyer.points = buyer
        .points
        .checked_add(moved.points)
        .ok_or_else(|| overflow("buyer points"))?;

    let record = TradeRecord {
        from_team: seller.name.clone(),
        to_team: buyer.name.clone(),
        player: moved.name.clone(),
        amount,
        points: moved.points,
        timestamp: Utc::now(),
    };
    buyer.roster.push(moved);

    Ok(SettledTrade {
        seller,
        buyer,
        record,
    })
}

/// Adds an auction win to `team`.
///
/// Duplicate players are not rejected: bidding twice on the same player
/// adds a second roster entry.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] unless `bid_amount > 0`,
/// [`LedgerError::InsufficientFunds`] if the bid exceeds the team's cash,
/// and [`LedgerError::Internal`] on points overflow.
pub fn apply_bid(
    mut team: TeamRecord,
    player_name: &str,
    bid_amount: i64,
    player_points: i64,
) -> Result<TeamRecord, LedgerError> {
    let amount = u64::try_from(bid_amount)
        .ok()
        .filter(|a| *a > 0)
        .ok_or_else(|| LedgerError::InvalidAmount(bid_amount.to_string()))?;

    team.cash = team
        .cash
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::InsufficientFunds {
            team: team.name.clone(),
            available: team.cash,
            required: amount,
        })?;
    team.points = team
        .points
        .checked_add(player_points)
        .ok_or_else(|| overflow("team points"))?;
    team.roster.push(RosterEntry::new(player_name, amount, player_points));

    Ok(team)
}

fn overflow(what: &str) -> LedgerError {
    LedgerError::Internal(format!("{what} overflow"))
}
