//! Database rows for teams and audit records, and their conversions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{BidRecord, RosterEntry, TeamId, TeamRecord, TradeRecord};
use crate::error::LedgerError;

/// A row of the `teams` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    /// Team UUID.
    pub id: Uuid,
    /// Unique team name.
    pub name: String,
    /// Remaining purse (`CHECK (cash >= 0)`).
    pub cash: i64,
    /// Running points total.
    pub points: i64,
    /// Roster as a JSONB array of `{name, amount, points}`.
    pub roster: serde_json::Value,
    /// Optimistic concurrency version, bumped on every update.
    pub version: i64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl TeamRow {
    /// Converts the row into a domain record plus its version.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Internal`] if the stored data violates the
    /// domain model (negative cash, malformed roster).
    pub fn into_record(self) -> Result<(TeamRecord, i64), LedgerError> {
        let cash = u64::try_from(self.cash)
            .map_err(|_| LedgerError::Internal(format!("team {} has negative cash", self.id)))?;
        let roster: Vec<RosterEntry> = serde_json::from_value(self.roster)
            .map_err(|e| LedgerError::Internal(format!("team {} roster: {e}", self.id)))?;
        Ok((
            TeamRecord {
                id: TeamId::from_uuid(self.id),
                name: self.name,
                cash,
                points: self.points,
                roster,
                created_at: self.created_at,
            },
            self.version,
        ))
    }
}

/// Column values for writing a team record.
#[derive(Debug, Clone)]
pub struct TeamColumns {
    /// Team UUID.
    pub id: Uuid,
    /// Team name.
    pub name: String,
    /// Cash as BIGINT.
    pub cash: i64,
    /// Points.
    pub points: i64,
    /// Roster as JSONB.
    pub roster: serde_json::Value,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&TeamRecord> for TeamColumns {
    type Error = LedgerError;

    fn try_from(team: &TeamRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *team.id.as_uuid(),
            name: team.name.clone(),
            cash: to_bigint(team.cash, "cash")?,
            points: team.points,
            roster: serde_json::to_value(&team.roster)
                .map_err(|e| LedgerError::Internal(format!("roster encoding: {e}")))?,
            created_at: team.created_at,
        })
    }
}

/// A row of the `bid_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BidRow {
    /// Winning team name.
    pub team_name: String,
    /// Player name.
    pub player_name: String,
    /// Bid amount.
    pub amount: i64,
    /// Commit timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<BidRow> for BidRecord {
    type Error = LedgerError;

    fn try_from(row: BidRow) -> Result<Self, Self::Error> {
        Ok(Self {
            team_name: row.team_name,
            player_name: row.player_name,
            amount: from_bigint(row.amount, "bid amount")?,
            timestamp: row.recorded_at,
        })
    }
}

/// A row of the `trade_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TradeRow {
    /// Selling team name.
    pub from_team: String,
    /// Buying team name.
    pub to_team: String,
    /// Player name.
    pub player: String,
    /// Cash paid.
    pub amount: i64,
    /// Points moved.
    pub points: i64,
    /// Commit timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<TradeRow> for TradeRecord {
    type Error = LedgerError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            from_team: row.from_team,
            to_team: row.to_team,
            player: row.player,
            amount: from_bigint(row.amount, "trade amount")?,
            points: row.points,
            timestamp: row.recorded_at,
        })
    }
}

/// Converts an unsigned amount to a BIGINT column value.
///
/// # Errors
///
/// Returns [`LedgerError::Internal`] if the value exceeds `i64::MAX`.
pub fn to_bigint(value: u64, field: &str) -> Result<i64, LedgerError> {
    i64::try_from(value).map_err(|_| LedgerError::Internal(format!("{field} exceeds BIGINT")))
}

fn from_bigint(value: i64, field: &str) -> Result<u64, LedgerError> {
    u64::try_from(value).map_err(|_| LedgerError::Internal(format!("negative {field} stored")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn team_round_trips_through_columns_and_row() {
        let mut team = TeamRecord::new("Mumbai", 42);
        team.points = 7;
        team.roster.push(RosterEntry::new("X", 10, 7));

        let Ok(cols) = TeamColumns::try_from(&team) else {
            panic!("columns");
        };
        let row = TeamRow {
            id: cols.id,
            name: cols.name,
            cash: cols.cash,
            points: cols.points,
            roster: cols.roster,
            version: 3,
            created_at: cols.created_at,
        };
        let Ok((decoded, version)) = row.into_record() else {
            panic!("decode");
        };
        assert_eq!(decoded, team);
        assert_eq!(version, 3);
    }

    #[test]
    fn negative_cash_row_is_rejected() {
        let row = TeamRow {
            id: Uuid::new_v4(),
            name: "Broken".to_string(),
            cash: -1,
            points: 0,
            roster: serde_json::json!([]),
            version: 0,
            created_at: Utc::now(),
        };
        assert!(matches!(row.into_record(), Err(LedgerError::Internal(_))));
    }

    #[test]
    fn oversized_amounts_do_not_fit_bigint() {
        assert!(to_bigint(u64::MAX, "cash").is_err());
        assert_eq!(to_bigint(5, "cash"), Ok(5));
    }
}
