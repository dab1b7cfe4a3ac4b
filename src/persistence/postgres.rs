//! PostgreSQL implementation of the team store and audit log.
//!
//! `run_atomic` reads the read set inside a transaction and writes each
//! update with `UPDATE ... WHERE id = $n AND version = $m`. A concurrent
//! committer bumps the version first, so the losing update matches zero
//! rows; the transaction is rolled back and reported as
//! [`LedgerError::Conflict`].

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{BidRow, TeamColumns, TeamRow, TradeRow, to_bigint};
use super::{AtomicWrite, AuditLog, TeamStore};
use crate::config::LeagueConfig;
use crate::domain::{
    AuditKind, AuditQuery, AuditRecord, BidRecord, SortOrder, TeamId, TeamRecord, TradeRecord,
};
use crate::error::LedgerError;

const TEAM_COLUMNS: &str = "id, name, cash, points, roster, version, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the configured pool limits and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::StoreUnavailable`] if the database cannot be
    /// reached or a migration fails.
    pub async fn connect(config: &LeagueConfig) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| LedgerError::StoreUnavailable(format!("migration failed: {e}")))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "postgres store ready"
        );
        Ok(Self::new(pool))
    }

    async fn load_bids(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, LedgerError> {
        let sql = format!(
            "SELECT team_name, player_name, amount, recorded_at FROM bid_records \
             WHERE ($1::text IS NULL OR team_name = $1) \
             AND ($2::text IS NULL OR player_name = $2) \
             ORDER BY recorded_at {dir}, id {dir} LIMIT $3",
            dir = sql_direction(query.order)
        );
        let rows = sqlx::query_as::<_, BidRow>(&sql)
            .bind(query.team.as_deref())
            .bind(query.player.as_deref())
            .bind(sql_limit(query.limit))
            .fetch_all(&self.pool)
            .await?;
        let mut records = rows
            .into_iter()
            .map(|row| BidRecord::try_from(row).map(AuditRecord::Bid))
            .collect::<Result<Vec<_>, _>>()?;
        into_append_order(&mut records, query.order);
        Ok(records)
    }

    async fn load_trades(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, LedgerError> {
        let sql = format!(
            "SELECT from_team, to_team, player, amount, points, recorded_at FROM trade_records \
             WHERE ($1::text IS NULL OR from_team = $1 OR to_team = $1) \
             AND ($2::text IS NULL OR player = $2) \
             ORDER BY recorded_at {dir}, id {dir} LIMIT $3",
            dir = sql_direction(query.order)
        );
        let rows = sqlx::query_as::<_, TradeRow>(&sql)
            .bind(query.team.as_deref())
            .bind(query.player.as_deref())
            .bind(sql_limit(query.limit))
            .fetch_all(&self.pool)
            .await?;
        let mut records = rows
            .into_iter()
            .map(|row| TradeRecord::try_from(row).map(AuditRecord::Trade))
            .collect::<Result<Vec<_>, _>>()?;
        into_append_order(&mut records, query.order);
        Ok(records)
    }
}

fn sql_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Newest => "DESC",
        SortOrder::Oldest => "ASC",
    }
}

fn sql_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
}

/// Rows fetched newest-first are reversed so that [`AuditQuery::arrange`]
/// sees append order.
fn into_append_order(records: &mut [AuditRecord], order: SortOrder) {
    if order == SortOrder::Newest {
        records.reverse();
    }
}

/// Maps a unique-violation on `teams.name` to a readable rejection.
fn map_team_write_err(err: sqlx::Error, name: &str) -> LedgerError {
    if let Some(db_err) = err.as_database_error()
        && db_err.is_unique_violation()
    {
        return LedgerError::InvalidRequest(format!("team name {name} is already taken"));
    }
    LedgerError::from(err)
}

impl TeamStore for PostgresStore {
    async fn get(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1");
        let row = sqlx::query_as::<_, TeamRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LedgerError::TeamNotFound(id))?;
        row.into_record().map(|(team, _)| team)
    }

    async fn list_all(&self) -> Result<Vec<TeamRecord>, LedgerError> {
        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY name, id");
        let rows = sqlx::query_as::<_, TeamRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| row.into_record().map(|(team, _)| team))
            .collect()
    }

    async fn insert(&self, team: TeamRecord) -> Result<TeamId, LedgerError> {
        let cols = TeamColumns::try_from(&team)?;
        sqlx::query(
            "INSERT INTO teams (id, name, cash, points, roster, version, created_at) \
             VALUES ($1, $2, $3, $4, $5, 0, $6)",
        )
        .bind(cols.id)
        .bind(&cols.name)
        .bind(cols.cash)
        .bind(cols.points)
        .bind(&cols.roster)
        .bind(cols.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_team_write_err(e, &cols.name))?;
        Ok(team.id)
    }

    async fn remove(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        let sql = format!("DELETE FROM teams WHERE id = $1 RETURNING {TEAM_COLUMNS}");
        let row = sqlx::query_as::<_, TeamRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LedgerError::TeamNotFound(id))?;
        row.into_record().map(|(team, _)| team)
    }

    async fn run_atomic<T, F>(&self, read_set: &[TeamId], write_fn: F) -> Result<T, LedgerError>
    where
        T: Send,
        F: FnOnce(Vec<TeamRecord>) -> Result<AtomicWrite<T>, LedgerError> + Send,
    {
        let ids: Vec<Uuid> = read_set.iter().map(|id| *id.as_uuid()).collect();
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, TeamRow>(&sql)
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await?;

        let mut fetched = Vec::with_capacity(rows.len());
        for row in rows {
            fetched.push(row.into_record()?);
        }

        let mut snapshot = Vec::with_capacity(read_set.len());
        for id in read_set {
            let entry = fetched
                .iter()
                .find(|(team, _)| team.id == *id)
                .cloned()
                .ok_or(LedgerError::TeamNotFound(*id))?;
            snapshot.push(entry);
        }

        let records = snapshot.iter().map(|(team, _)| team.clone()).collect();
        let write = write_fn(records)?;

        for update in &write.updates {
            let version = snapshot
                .iter()
                .find(|(team, _)| team.id == update.id)
                .map(|(_, version)| *version)
                .ok_or_else(|| {
                    LedgerError::Internal(format!("team {} written outside read set", update.id))
                })?;
            let cols = TeamColumns::try_from(update)?;
            let result = sqlx::query(
                "UPDATE teams SET name = $1, cash = $2, points = $3, roster = $4, \
                 version = version + 1 WHERE id = $5 AND version = $6",
            )
            .bind(&cols.name)
            .bind(cols.cash)
            .bind(cols.points)
            .bind(&cols.roster)
            .bind(cols.id)
            .bind(version)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_team_write_err(e, &cols.name))?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(LedgerError::Conflict);
            }
        }

        tx.commit().await?;
        Ok(write.output)
    }
}

impl AuditLog for PostgresStore {
    async fn append(&self, record: AuditRecord) -> Result<(), LedgerError> {
        match record {
            AuditRecord::Bid(bid) => {
                sqlx::query(
                    "INSERT INTO bid_records (team_name, player_name, amount, recorded_at) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(&bid.team_name)
                .bind(&bid.player_name)
                .bind(to_bigint(bid.amount, "bid amount")?)
                .bind(bid.timestamp)
                .execute(&self.pool)
                .await?;
            }
            AuditRecord::Trade(trade) => {
                sqlx::query(
                    "INSERT INTO trade_records \
                     (from_team, to_team, player, amount, points, recorded_at) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(&trade.from_team)
                .bind(&trade.to_team)
                .bind(&trade.player)
                .bind(to_bigint(trade.amount, "trade amount")?)
                .bind(trade.points)
                .bind(trade.timestamp)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    async fn query_by_player(&self, player_name: &str) -> Result<Vec<BidRecord>, LedgerError> {
        let rows = sqlx::query_as::<_, BidRow>(
            "SELECT team_name, player_name, amount, recorded_at FROM bid_records \
             WHERE player_name = $1 ORDER BY recorded_at DESC, id DESC",
        )
        .bind(player_name)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(BidRecord::try_from).collect()
    }

    async fn query_all(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, LedgerError> {
        let mut records = Vec::new();
        if query.kind != Some(AuditKind::Trade) {
            records.extend(self.load_bids(query).await?);
        }
        if query.kind != Some(AuditKind::Bid) {
            records.extend(self.load_trades(query).await?);
        }
        Ok(query.arrange(records))
    }
}
