//! Per-connection subscription manager.
//!
//! Tracks which teams a WebSocket client follows and provides server-side
//! event filtering.

use std::collections::HashSet;

use crate::domain::TeamId;

/// Manages the set of team subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed teams. Ignored while `subscribe_all` is set.
    team_ids: HashSet<TeamId>,
    /// Whether the client follows every team (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds teams to the subscription set. `wildcard` follows every team.
    pub fn subscribe(&mut self, ids: &[TeamId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.team_ids.extend(ids.iter().copied());
    }

    /// Removes teams from the subscription set. `wildcard` clears the
    /// follow-everything flag.
    pub fn unsubscribe(&mut self, ids: &[TeamId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.team_ids.remove(id);
        }
    }

    /// Returns `true` if an event touching `team_ids` should be delivered.
    #[must_use]
    pub fn matches(&self, team_ids: &[TeamId]) -> bool {
        self.subscribe_all || team_ids.iter().any(|id| self.team_ids.contains(id))
    }

    /// Returns the number of explicitly followed teams.
    #[must_use]
    pub fn count(&self) -> usize {
        self.team_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub const fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
