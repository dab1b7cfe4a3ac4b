//! Team records and roster entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::TeamId;

/// Starting purse for a newly registered team (10 crore).
pub const DEFAULT_TEAM_CASH: u64 = 100_000_000;

/// A player owned by a team.
///
/// `amount` is the price the team originally paid at auction and travels
/// unchanged with the player through trades. `points` is fixed when the
/// player is first acquired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RosterEntry {
    /// Player name, the roster key.
    pub name: String,
    /// Purchase amount in rupees.
    pub amount: u64,
    /// Fantasy points the player carries.
    pub points: i64,
}

impl RosterEntry {
    /// Creates a new roster entry.
    #[must_use]
    pub fn new(name: impl Into<String>, amount: u64, points: i64) -> Self {
        Self {
            name: name.into(),
            amount,
            points,
        }
    }
}

/// Persisted state of a single team.
///
/// Mutated only through [`crate::persistence::TeamStore::run_atomic`], never
/// by an unsynchronized read-then-write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamRecord {
    /// Unique team identifier (immutable after registration).
    pub id: TeamId,
    /// Display name. Bid records refer to teams by this name.
    pub name: String,
    /// Remaining purse in rupees. Never negative.
    pub cash: u64,
    /// Running fantasy points total.
    pub points: i64,
    /// Players currently owned, in acquisition order.
    pub roster: Vec<RosterEntry>,
    /// Registration timestamp (immutable after registration).
    pub created_at: DateTime<Utc>,
}

impl TeamRecord {
    /// Creates a freshly registered team with an empty roster and zero points.
    #[must_use]
    pub fn new(name: impl Into<String>, cash: u64) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            cash,
            points: 0,
            roster: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Returns the first roster entry with the given player name.
    #[must_use]
    pub fn find_player(&self, player_name: &str) -> Option<&RosterEntry> {
        self.roster.iter().find(|p| p.name == player_name)
    }

    /// Removes and returns the first roster entry with the given player name.
    pub fn take_player(&mut self, player_name: &str) -> Option<RosterEntry> {
        let idx = self.roster.iter().position(|p| p.name == player_name)?;
        Some(self.roster.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_with(players: &[(&str, u64, i64)]) -> TeamRecord {
        let mut team = TeamRecord::new("Chennai Chargers", DEFAULT_TEAM_CASH);
        for (name, amount, points) in players {
            team.roster.push(RosterEntry::new(*name, *amount, *points));
        }
        team
    }

    #[test]
    fn new_team_starts_empty() {
        let team = TeamRecord::new("Delhi Daredevils", 5_000);
        assert_eq!(team.cash, 5_000);
        assert_eq!(team.points, 0);
        assert!(team.roster.is_empty());
    }

    #[test]
    fn take_player_removes_only_first_match() {
        let mut team = team_with(&[("Kohli", 10, 40), ("Kohli", 20, 40), ("Bumrah", 5, 30)]);
        let taken = team.take_player("Kohli");
        assert_eq!(taken, Some(RosterEntry::new("Kohli", 10, 40)));
        assert_eq!(team.roster.len(), 2);
        assert!(team.find_player("Kohli").is_some());
    }

    #[test]
    fn take_missing_player_is_none() {
        let mut team = team_with(&[("Bumrah", 5, 30)]);
        assert!(team.take_player("Dhoni").is_none());
        assert_eq!(team.roster.len(), 1);
    }
}
