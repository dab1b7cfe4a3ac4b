//! Persistence layer: the team store and the append-only audit log.
//!
//! The service never touches a concrete backend. It is handed a
//! [`TeamStore`] and an [`AuditLog`] at construction time; [`Persistence`]
//! selects between the in-memory backend and PostgreSQL at startup.
//!
//! # Atomicity
//!
//! Team records are mutated only through [`TeamStore::run_atomic`]: the
//! store snapshots the read set, hands it to a synchronous write function,
//! and commits the returned records only if none of them changed since the
//! snapshot. A concurrent change surfaces as [`LedgerError::Conflict`] and
//! nothing is written.

pub mod memory;
pub mod models;
pub mod postgres;

use std::future::Future;
use std::sync::Arc;

use crate::domain::{AuditQuery, AuditRecord, BidRecord, TeamId, TeamRecord};
use crate::error::LedgerError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Records to commit from an atomic write function, plus the value handed
/// back to the caller once the commit succeeds.
#[derive(Debug, Clone)]
pub struct AtomicWrite<T> {
    /// Updated team records. Every record must belong to the read set.
    pub updates: Vec<TeamRecord>,
    /// Caller-defined output, returned only after commit.
    pub output: T,
}

impl<T> AtomicWrite<T> {
    /// Creates a write of `updates` returning `output`.
    #[must_use]
    pub fn new(updates: Vec<TeamRecord>, output: T) -> Self {
        Self { updates, output }
    }
}

/// Keyed storage of team records with an all-or-nothing multi-record
/// transaction.
pub trait TeamStore: Send + Sync {
    /// Fetches a single team.
    ///
    /// # Errors
    ///
    /// [`LedgerError::TeamNotFound`] or [`LedgerError::StoreUnavailable`].
    fn get(&self, id: TeamId) -> impl Future<Output = Result<TeamRecord, LedgerError>> + Send;

    /// Lists every team ordered by name.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StoreUnavailable`] on backend failure.
    fn list_all(&self) -> impl Future<Output = Result<Vec<TeamRecord>, LedgerError>> + Send;

    /// Inserts a newly registered team.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidRequest`] if the id or name is already taken.
    fn insert(&self, team: TeamRecord) -> impl Future<Output = Result<TeamId, LedgerError>> + Send;

    /// Removes a team, returning its final state.
    ///
    /// # Errors
    ///
    /// [`LedgerError::TeamNotFound`] or [`LedgerError::StoreUnavailable`].
    fn remove(&self, id: TeamId) -> impl Future<Output = Result<TeamRecord, LedgerError>> + Send;

    /// Reads `read_set`, runs `write_fn` on the snapshot (in read-set order)
    /// and commits its updates atomically.
    ///
    /// # Errors
    ///
    /// Any error returned by `write_fn` (nothing is written),
    /// [`LedgerError::TeamNotFound`] for an unknown id in the read set,
    /// [`LedgerError::Conflict`] if a record changed before commit, and
    /// [`LedgerError::StoreUnavailable`] on backend failure.
    fn run_atomic<T, F>(
        &self,
        read_set: &[TeamId],
        write_fn: F,
    ) -> impl Future<Output = Result<T, LedgerError>> + Send
    where
        T: Send,
        F: FnOnce(Vec<TeamRecord>) -> Result<AtomicWrite<T>, LedgerError> + Send;
}

/// Append-only log of bid and trade records.
pub trait AuditLog: Send + Sync {
    /// Appends a record. Records are never mutated or deleted.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StoreUnavailable`] on backend failure.
    fn append(&self, record: AuditRecord) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Returns every bid record naming `player_name`, most recent first.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StoreUnavailable`] on backend failure.
    fn query_by_player(
        &self,
        player_name: &str,
    ) -> impl Future<Output = Result<Vec<BidRecord>, LedgerError>> + Send;

    /// Returns records matching `query`, ordered and limited as requested.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StoreUnavailable`] on backend failure.
    fn query_all(
        &self,
        query: &AuditQuery,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, LedgerError>> + Send;
}

/// Backend selected by `STORE_BACKEND` at startup.
#[derive(Debug, Clone)]
pub enum Persistence {
    /// Process-local store; state is lost on restart.
    Memory(Arc<MemoryStore>),
    /// PostgreSQL store.
    Postgres(PostgresStore),
}

impl Persistence {
    /// Returns the backend name for logging.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl TeamStore for Persistence {
    async fn get(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        match self {
            Self::Memory(store) => store.get(id).await,
            Self::Postgres(store) => store.get(id).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<TeamRecord>, LedgerError> {
        match self {
            Self::Memory(store) => store.list_all().await,
            Self::Postgres(store) => store.list_all().await,
        }
    }

    async fn insert(&self, team: TeamRecord) -> Result<TeamId, LedgerError> {
        match self {
            Self::Memory(store) => store.insert(team).await,
            Self::Postgres(store) => store.insert(team).await,
        }
    }

    async fn remove(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        match self {
            Self::Memory(store) => store.remove(id).await,
            Self::Postgres(store) => store.remove(id).await,
        }
    }

    async fn run_atomic<T, F>(&self, read_set: &[TeamId], write_fn: F) -> Result<T, LedgerError>
    where
        T: Send,
        F: FnOnce(Vec<TeamRecord>) -> Result<AtomicWrite<T>, LedgerError> + Send,
    {
        match self {
            Self::Memory(store) => store.run_atomic(read_set, write_fn).await,
            Self::Postgres(store) => store.run_atomic(read_set, write_fn).await,
        }
    }
}

impl AuditLog for Persistence {
    async fn append(&self, record: AuditRecord) -> Result<(), LedgerError> {
        match self {
            Self::Memory(store) => store.append(record).await,
            Self::Postgres(store) => store.append(record).await,
        }
    }

    async fn query_by_player(&self, player_name: &str) -> Result<Vec<BidRecord>, LedgerError> {
        match self {
            Self::Memory(store) => store.query_by_player(player_name).await,
            Self::Postgres(store) => store.query_by_player(player_name).await,
        }
    }

    async fn query_all(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, LedgerError> {
        match self {
            Self::Memory(store) => store.query_all(query).await,
            Self::Postgres(store) => store.query_all(query).await,
        }
    }
}

/// Makes any `Arc`-wrapped store usable where a store is expected.
impl<S: TeamStore> TeamStore for Arc<S> {
    fn get(&self, id: TeamId) -> impl Future<Output = Result<TeamRecord, LedgerError>> + Send {
        S::get(self, id)
    }

    fn list_all(&self) -> impl Future<Output = Result<Vec<TeamRecord>, LedgerError>> + Send {
        S::list_all(self)
    }

    fn insert(&self, team: TeamRecord) -> impl Future<Output = Result<TeamId, LedgerError>> + Send {
        S::insert(self, team)
    }

    fn remove(&self, id: TeamId) -> impl Future<Output = Result<TeamRecord, LedgerError>> + Send {
        S::remove(self, id)
    }

    fn run_atomic<T, F>(
        &self,
        read_set: &[TeamId],
        write_fn: F,
    ) -> impl Future<Output = Result<T, LedgerError>> + Send
    where
        T: Send,
        F: FnOnce(Vec<TeamRecord>) -> Result<AtomicWrite<T>, LedgerError> + Send,
    {
        S::run_atomic(self, read_set, write_fn)
    }
}

impl<A: AuditLog> AuditLog for Arc<A> {
    fn append(&self, record: AuditRecord) -> impl Future<Output = Result<(), LedgerError>> + Send {
        A::append(self, record)
    }

    fn query_by_player(
        &self,
        player_name: &str,
    ) -> impl Future<Output = Result<Vec<BidRecord>, LedgerError>> + Send {
        A::query_by_player(self, player_name)
    }

    fn query_all(
        &self,
        query: &AuditQuery,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, LedgerError>> + Send {
        A::query_all(self, query)
    }
}
