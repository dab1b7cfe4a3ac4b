//! In-memory team store and audit log.
//!
//! [`MemoryStore`] keeps every team under a single `RwLock<HashMap<..>>`,
//! each entry tagged with a version that is bumped on every commit.
//! [`TeamStore::run_atomic`] is optimistic: it snapshots the read set under
//! the read lock, runs the write function with no lock held, then re-checks
//! the versions under the write lock before applying anything.
//!
//! # Concurrency
//!
//! - Any number of readers and snapshots may run concurrently.
//! - Commits are serialized by the write lock.
//! - Two transactions touching the same team: the first to commit wins,
//!   the second observes a version mismatch and fails with
//!   [`LedgerError::Conflict`].

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{AtomicWrite, AuditLog, TeamStore};
use crate::domain::{AuditKind, AuditQuery, AuditRecord, BidRecord, TeamId, TeamRecord};
use crate::error::LedgerError;

/// A team record tagged with its commit version.
#[derive(Debug, Clone)]
struct VersionedTeam {
    version: u64,
    record: TeamRecord,
}

/// Process-local team store and audit log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    teams: RwLock<HashMap<TeamId, VersionedTeam>>,
    audit: RwLock<Vec<AuditRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered teams.
    pub async fn team_count(&self) -> usize {
        self.teams.read().await.len()
    }

    /// Returns the number of audit records.
    pub async fn audit_len(&self) -> usize {
        self.audit.read().await.len()
    }

    /// Copies the read set, in order, together with each record's version.
    async fn snapshot(&self, read_set: &[TeamId]) -> Result<Vec<VersionedTeam>, LedgerError> {
        let map = self.teams.read().await;
        read_set
            .iter()
            .map(|id| map.get(id).cloned().ok_or(LedgerError::TeamNotFound(*id)))
            .collect()
    }

    /// Applies `updates` if every updated team still has its snapshot version.
    async fn commit(
        &self,
        snapshot: &[VersionedTeam],
        updates: Vec<TeamRecord>,
    ) -> Result<(), LedgerError> {
        let mut map = self.teams.write().await;

        for update in &updates {
            let expected = snapshot
                .iter()
                .find(|s| s.record.id == update.id)
                .ok_or_else(|| {
                    LedgerError::Internal(format!("team {} written outside read set", update.id))
                })?;
            let current = map.get(&update.id).ok_or(LedgerError::Conflict)?;
            if current.version != expected.version {
                return Err(LedgerError::Conflict);
            }
            if map
                .values()
                .any(|t| t.record.id != update.id && t.record.name == update.name)
            {
                return Err(name_taken(&update.name));
            }
        }

        for update in updates {
            if let Some(slot) = map.get_mut(&update.id) {
                slot.version = slot.version.saturating_add(1);
                slot.record = update;
            }
        }
        Ok(())
    }
}

fn name_taken(name: &str) -> LedgerError {
    LedgerError::InvalidRequest(format!("team name {name} is already taken"))
}

impl TeamStore for MemoryStore {
    async fn get(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        let map = self.teams.read().await;
        map.get(&id)
            .map(|t| t.record.clone())
            .ok_or(LedgerError::TeamNotFound(id))
    }

    async fn list_all(&self) -> Result<Vec<TeamRecord>, LedgerError> {
        let map = self.teams.read().await;
        let mut teams: Vec<TeamRecord> = map.values().map(|t| t.record.clone()).collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(teams)
    }

    async fn insert(&self, team: TeamRecord) -> Result<TeamId, LedgerError> {
        let id = team.id;
        let mut map = self.teams.write().await;
        if map.contains_key(&id) {
            return Err(LedgerError::InvalidRequest(format!("team {id} already exists")));
        }
        if map.values().any(|t| t.record.name == team.name) {
            return Err(name_taken(&team.name));
        }
        map.insert(
            id,
            VersionedTeam {
                version: 0,
                record: team,
            },
        );
        Ok(id)
    }

    async fn remove(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        let mut map = self.teams.write().await;
        map.remove(&id)
            .map(|t| t.record)
            .ok_or(LedgerError::TeamNotFound(id))
    }

    async fn run_atomic<T, F>(&self, read_set: &[TeamId], write_fn: F) -> Result<T, LedgerError>
    where
        T: Send,
        F: FnOnce(Vec<TeamRecord>) -> Result<AtomicWrite<T>, LedgerError> + Send,
    {
        let snapshot = self.snapshot(read_set).await?;
        let records = snapshot.iter().map(|s| s.record.clone()).collect();
        let write = write_fn(records)?;
        self.commit(&snapshot, write.updates).await?;
        Ok(write.output)
    }
}

impl AuditLog for MemoryStore {
    async fn append(&self, record: AuditRecord) -> Result<(), LedgerError> {
        self.audit.write().await.push(record);
        Ok(())
    }

    async fn query_by_player(&self, player_name: &str) -> Result<Vec<BidRecord>, LedgerError> {
        let query = AuditQuery {
            kind: Some(AuditKind::Bid),
            player: Some(player_name.to_string()),
            ..AuditQuery::default()
        };
        let bids = self
            .query_all(&query)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                AuditRecord::Bid(bid) => Some(bid),
                AuditRecord::Trade(_) => None,
            })
            .collect();
        Ok(bids)
    }

    async fn query_all(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, LedgerError> {
        let log = self.audit.read().await;
        let matching = log.iter().filter(|r| query.matches(r)).cloned().collect();
        Ok(query.arrange(matching))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{RosterEntry, TradeRecord};
    use chrono::{Duration, Utc};

    async fn store_with(names: &[&str]) -> (MemoryStore, Vec<TeamId>) {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in names {
            let Ok(id) = store.insert(TeamRecord::new(*name, 1_000)).await else {
                panic!("insert {name} failed");
            };
            ids.push(id);
        }
        (store, ids)
    }

    fn bid(team: &str, player: &str, seconds_ago: i64) -> AuditRecord {
        AuditRecord::Bid(BidRecord {
            team_name: team.to_string(),
            player_name: player.to_string(),
            amount: 100,
            timestamp: Utc::now() - Duration::seconds(seconds_ago),
        })
    }

    #[tokio::test]
    async fn insert_and_get() {
        let (store, ids) = store_with(&["Hyderabad Hawks"]).await;
        let Some(id) = ids.first().copied() else {
            panic!("one id");
        };
        let Ok(team) = store.get(id).await else {
            panic!("team should exist");
        };
        assert_eq!(team.name, "Hyderabad Hawks");
        assert!(store.get(TeamId::new()).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let (store, _) = store_with(&["Punjab Panthers"]).await;
        let result = store.insert(TeamRecord::new("Punjab Panthers", 5)).await;
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));
        assert_eq!(store.team_count().await, 1);
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let (store, _) = store_with(&["Rajasthan", "Bangalore", "Lucknow"]).await;
        let Ok(teams) = store.list_all().await else {
            panic!("list failed");
        };
        let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Bangalore", "Lucknow", "Rajasthan"]);
    }

    #[tokio::test]
    async fn remove_returns_final_state() {
        let (store, ids) = store_with(&["Gujarat"]).await;
        let Some(id) = ids.first().copied() else {
            panic!("one id");
        };
        assert!(store.remove(id).await.is_ok());
        assert!(matches!(
            store.remove(id).await,
            Err(LedgerError::TeamNotFound(_))
        ));
    }

    #[tokio::test]
    async fn run_atomic_commits_all_updates() {
        let (store, ids) = store_with(&["A", "B"]).await;
        let result = store
            .run_atomic(&ids, |mut teams| {
                for team in &mut teams {
                    team.cash += 10;
                    team.roster.push(RosterEntry::new("X", 1, 1));
                }
                Ok(AtomicWrite::new(teams, "done"))
            })
            .await;
        assert_eq!(result, Ok("done"));

        let Ok(teams) = store.list_all().await else {
            panic!("list failed");
        };
        assert!(teams.iter().all(|t| t.cash == 1_010 && t.roster.len() == 1));
    }

    #[tokio::test]
    async fn write_fn_error_writes_nothing() {
        let (store, ids) = store_with(&["A"]).await;
        let result: Result<(), _> = store
            .run_atomic(&ids, |mut teams| {
                if let Some(team) = teams.first_mut() {
                    team.cash = 0;
                }
                Err(LedgerError::SelfTrade)
            })
            .await;
        assert_eq!(result, Err(LedgerError::SelfTrade));

        let Ok(teams) = store.list_all().await else {
            panic!("list failed");
        };
        assert!(teams.iter().all(|t| t.cash == 1_000));
    }

    #[tokio::test]
    async fn unknown_team_in_read_set() {
        let (store, _) = store_with(&["A"]).await;
        let missing = TeamId::new();
        let result = store
            .run_atomic(&[missing], |teams| Ok(AtomicWrite::new(teams, ())))
            .await;
        assert_eq!(result, Err(LedgerError::TeamNotFound(missing)));
    }

    #[tokio::test]
    async fn stale_snapshot_conflicts() {
        let (store, ids) = store_with(&["A", "B"]).await;
        let Ok(stale) = store.snapshot(&ids).await else {
            panic!("snapshot failed");
        };

        // Another transaction commits first.
        let first = store
            .run_atomic(&ids, |teams| Ok(AtomicWrite::new(teams, ())))
            .await;
        assert!(first.is_ok());

        let updates = stale.iter().map(|s| s.record.clone()).collect();
        assert_eq!(
            store.commit(&stale, updates).await,
            Err(LedgerError::Conflict)
        );
    }

    #[tokio::test]
    async fn writes_outside_read_set_are_refused() {
        let (store, ids) = store_with(&["A", "B"]).await;
        let (Some(a), Some(b)) = (ids.first().copied(), ids.get(1).copied()) else {
            panic!("two ids");
        };
        let Ok(b_record) = store.get(b).await else {
            panic!("b exists");
        };
        let result = store
            .run_atomic(&[a], move |_| Ok(AtomicWrite::new(vec![b_record], ())))
            .await;
        assert!(matches!(result, Err(LedgerError::Internal(_))));
    }

    #[tokio::test]
    async fn rename_onto_existing_name_is_refused() {
        let (store, ids) = store_with(&["A", "B"]).await;
        let Some(a) = ids.first().copied() else {
            panic!("one id");
        };
        let result = store
            .run_atomic(&[a], |mut teams| {
                if let Some(team) = teams.first_mut() {
                    team.name = "B".to_string();
                }
                Ok(AtomicWrite::new(teams, ()))
            })
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn query_by_player_is_most_recent_first() {
        let store = MemoryStore::new();
        let _ = store.append(bid("A", "X", 30)).await;
        let _ = store.append(bid("B", "Y", 20)).await;
        let _ = store.append(bid("C", "X", 10)).await;

        let Ok(bids) = store.query_by_player("X").await else {
            panic!("query failed");
        };
        let teams: Vec<&str> = bids.iter().map(|b| b.team_name.as_str()).collect();
        assert_eq!(teams, vec!["C", "A"]);
    }

    #[tokio::test]
    async fn query_by_player_ignores_trades() {
        let store = MemoryStore::new();
        let _ = store
            .append(AuditRecord::Trade(TradeRecord {
                from_team: "A".to_string(),
                to_team: "B".to_string(),
                player: "X".to_string(),
                amount: 1,
                points: 1,
                timestamp: Utc::now(),
            }))
            .await;
        let Ok(bids) = store.query_by_player("X").await else {
            panic!("query failed");
        };
        assert!(bids.is_empty());
        assert_eq!(store.audit_len().await, 1);
    }
}
