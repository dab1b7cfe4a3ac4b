//! League service: orchestrates team, bid and trade operations and emits
//! events.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::transfer::precheck_trade;
use crate::domain::{
    AuditKind, AuditQuery, AuditRecord, BidRecord, DEFAULT_TEAM_CASH, EventBus, LedgerEvent,
    PlayerCatalog, SettledTrade, TeamId, TeamRecord, TradeRecord, apply_bid, apply_trade,
    validate_trade,
};
use crate::error::LedgerError;
use crate::persistence::{AtomicWrite, AuditLog, Persistence, TeamStore};

/// How many times a transaction that lost an optimistic commit is re-run.
const CONFLICT_RETRIES: u32 = 1;

/// Default length of the recent-trades log.
pub const DEFAULT_TRADE_LOG_LIMIT: usize = 10;

/// Outcome of a committed bid.
#[derive(Debug, Clone)]
pub struct BidReceipt {
    /// Winning team after the bid.
    pub team: TeamRecord,
    /// The bid record handed to the audit log.
    pub record: BidRecord,
    /// Set when the commit succeeded but the audit append failed.
    pub audit_error: Option<String>,
}

/// Outcome of a committed trade.
#[derive(Debug, Clone)]
pub struct TradeReceipt {
    /// Seller after the trade.
    pub seller: TeamRecord,
    /// Buyer after the trade.
    pub buyer: TeamRecord,
    /// The trade record handed to the audit log.
    pub record: TradeRecord,
    /// Set when the commit succeeded but the audit append failed.
    pub audit_error: Option<String>,
}

/// Administrative edit of a team. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TeamUpdate {
    /// New unique name.
    pub name: Option<String>,
    /// New cash balance; must be non-negative.
    pub cash: Option<i64>,
    /// New points total.
    pub points: Option<i64>,
}

/// One row of the leaderboard.
#[derive(Debug, Clone)]
pub struct Standing {
    /// 1-based rank.
    pub rank: usize,
    /// Team state.
    pub team: TeamRecord,
    /// The team's auction wins, most recent first.
    pub bids: Vec<BidRecord>,
}

/// Orchestration layer for all ledger operations.
///
/// Owns the injected [`TeamStore`] and [`AuditLog`] plus the [`EventBus`].
/// Every mutation follows the same pattern: cheap checks → atomic
/// read-validate-write on the store (retried once on conflict) → append the
/// audit record → emit the event → return a receipt.
#[derive(Debug, Clone)]
pub struct LeagueService<S = Persistence, A = Persistence> {
    teams: S,
    audit: A,
    event_bus: EventBus,
    catalog: Arc<PlayerCatalog>,
    default_cash: u64,
    trade_log_limit: usize,
}

impl<S: TeamStore, A: AuditLog> LeagueService<S, A> {
    /// Creates a new `LeagueService` with an empty catalog and default
    /// limits.
    #[must_use]
    pub fn new(teams: S, audit: A, event_bus: EventBus) -> Self {
        Self {
            teams,
            audit,
            event_bus,
            catalog: Arc::new(PlayerCatalog::default()),
            default_cash: DEFAULT_TEAM_CASH,
            trade_log_limit: DEFAULT_TRADE_LOG_LIMIT,
        }
    }

    /// Sets the player catalog used to resolve bid points.
    #[must_use]
    pub fn with_catalog(mut self, catalog: PlayerCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Sets the purse given to teams registered without explicit cash.
    #[must_use]
    pub const fn with_default_cash(mut self, cash: u64) -> Self {
        self.default_cash = cash;
        self
    }

    /// Sets the default length of the recent-trades log.
    #[must_use]
    pub const fn with_trade_log_limit(mut self, limit: usize) -> Self {
        self.trade_log_limit = limit;
        self
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the player catalog.
    #[must_use]
    pub fn catalog(&self) -> &PlayerCatalog {
        &self.catalog
    }

    /// Registers a new team.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] if the name is blank or
    /// already taken, or a store error.
    pub async fn register_team(
        &self,
        name: &str,
        initial_cash: Option<u64>,
    ) -> Result<TeamRecord, LedgerError> {
        let name = non_blank("team name", name)?;
        let team = TeamRecord::new(name, initial_cash.unwrap_or(self.default_cash));
        self.teams.insert(team.clone()).await?;

        let _ = self.event_bus.publish(LedgerEvent::TeamRegistered {
            team_id: team.id,
            name: team.name.clone(),
            cash: team.cash,
            timestamp: team.created_at,
        });

        tracing::info!(team_id = %team.id, name = %team.name, cash = team.cash, "team registered");
        Ok(team)
    }

    /// Applies an administrative edit to a team.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] for negative cash,
    /// [`LedgerError::InvalidRequest`] for a blank or taken name,
    /// [`LedgerError::TeamNotFound`], or a store error.
    pub async fn update_team(
        &self,
        id: TeamId,
        update: TeamUpdate,
    ) -> Result<TeamRecord, LedgerError> {
        let name = update
            .name
            .as_deref()
            .map(|n| non_blank("team name", n))
            .transpose()?;
        let cash = update
            .cash
            .map(|c| u64::try_from(c).map_err(|_| LedgerError::InvalidAmount(c.to_string())))
            .transpose()?;
        let points = update.points;

        let team = self
            .retry_on_conflict("update_team", move || {
                let name = name.clone();
                async move {
                    self.teams
                        .run_atomic(&[id], move |teams| {
                            let mut team = teams
                                .into_iter()
                                .next()
                                .ok_or(LedgerError::TeamNotFound(id))?;
                            if let Some(name) = name {
                                team.name = name;
                            }
                            if let Some(cash) = cash {
                                team.cash = cash;
                            }
                            if let Some(points) = points {
                                team.points = points;
                            }
                            Ok(AtomicWrite::new(vec![team.clone()], team))
                        })
                        .await
                }
            })
            .await?;

        let _ = self.event_bus.publish(LedgerEvent::TeamUpdated {
            team_id: team.id,
            name: team.name.clone(),
            cash: team.cash,
            points: team.points,
            timestamp: Utc::now(),
        });

        tracing::info!(team_id = %team.id, name = %team.name, "team updated");
        Ok(team)
    }

    /// Removes a team. Its audit records are kept.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TeamNotFound`] or a store error.
    pub async fn remove_team(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        let team = self.teams.remove(id).await?;

        let _ = self.event_bus.publish(LedgerEvent::TeamRemoved {
            team_id: id,
            timestamp: Utc::now(),
        });

        tracing::info!(team_id = %id, name = %team.name, "team removed");
        Ok(team)
    }

    /// Fetches one team.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TeamNotFound`] or a store error.
    pub async fn get_team(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
        self.teams.get(id).await
    }

    /// Lists every team ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list_teams(&self) -> Result<Vec<TeamRecord>, LedgerError> {
        self.teams.list_all().await
    }

    /// Records an auction win: debits the bid, adds the player to the
    /// roster and appends a bid record.
    ///
    /// Points come from `points` when given, otherwise from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] unless `amount > 0`,
    /// [`LedgerError::InvalidRequest`] for a blank or uncatalogued player
    /// without explicit points, [`LedgerError::InsufficientFunds`],
    /// [`LedgerError::TeamNotFound`], or a store error.
    pub async fn place_bid(
        &self,
        team_id: TeamId,
        player_name: &str,
        amount: i64,
        points: Option<i64>,
    ) -> Result<BidReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount.to_string()));
        }
        let player = non_blank("player name", player_name)?;
        let player_points = match points {
            Some(points) => points,
            None => self.catalog.points_for(&player).ok_or_else(|| {
                LedgerError::InvalidRequest(format!(
                    "{player} is not in the player catalog; points must be given"
                ))
            })?,
        };

        let (team, record) = self
            .retry_on_conflict("place_bid", move || {
                let player = player.clone();
                async move {
                    self.teams
                        .run_atomic(&[team_id], move |teams| {
                            let team = teams
                                .into_iter()
                                .next()
                                .ok_or(LedgerError::TeamNotFound(team_id))?;
                            let team = apply_bid(team, &player, amount, player_points)?;
                            let record = BidRecord {
                                team_name: team.name.clone(),
                                player_name: player,
                                amount: amount.unsigned_abs(),
                                timestamp: Utc::now(),
                            };
                            Ok(AtomicWrite::new(vec![team.clone()], (team, record)))
                        })
                        .await
                }
            })
            .await?;

        let audit_error = self.append_audit(record.clone().into()).await;

        let _ = self.event_bus.publish(LedgerEvent::BidPlaced {
            team_id,
            cash_after: team.cash,
            points_after: team.points,
            bid: record.clone(),
        });

        tracing::info!(
            team = %team.name,
            player = %record.player_name,
            amount = record.amount,
            points = player_points,
            "bid committed"
        );
        Ok(BidReceipt {
            team,
            record,
            audit_error,
        })
    }

    /// Sells `player_name` from `seller_id` to `buyer_id` for `amount`.
    ///
    /// Self-trades and negative amounts are rejected before the store is
    /// touched. Validation and settlement run inside one atomic unit on the
    /// transaction's snapshot; a lost commit is re-run once against fresh
    /// bid history and team records.
    ///
    /// # Errors
    ///
    /// Any trade-rule rejection from [`validate_trade`],
    /// [`LedgerError::TeamNotFound`], [`LedgerError::Conflict`] if the retry
    /// also loses, or a store error.
    pub async fn execute_trade(
        &self,
        seller_id: TeamId,
        buyer_id: TeamId,
        player_name: &str,
        amount: i64,
    ) -> Result<TradeReceipt, LedgerError> {
        precheck_trade(seller_id, buyer_id, amount)?;
        let player = player_name.trim();

        let settled = self
            .retry_on_conflict("execute_trade", move || {
                self.settle_trade(seller_id, buyer_id, player, amount)
            })
            .await?;
        let SettledTrade {
            seller,
            buyer,
            record,
        } = settled;

        let audit_error = self.append_audit(record.clone().into()).await;

        let _ = self.event_bus.publish(LedgerEvent::TradeCompleted {
            seller_id,
            buyer_id,
            trade: record.clone(),
        });

        tracing::info!(
            seller = %record.from_team,
            buyer = %record.to_team,
            player = %record.player,
            amount = record.amount,
            points = record.points,
            "trade committed"
        );
        Ok(TradeReceipt {
            seller,
            buyer,
            record,
            audit_error,
        })
    }

    /// Returns every team ranked by points, then cash, then name.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn leaderboard(&self) -> Result<Vec<Standing>, LedgerError> {
        let mut teams = self.teams.list_all().await?;
        teams.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.cash.cmp(&a.cash))
                .then_with(|| a.name.cmp(&b.name))
        });

        let query = AuditQuery {
            kind: Some(AuditKind::Bid),
            ..AuditQuery::default()
        };
        let mut bids_by_team: HashMap<String, Vec<BidRecord>> = HashMap::new();
        for record in self.audit.query_all(&query).await? {
            if let AuditRecord::Bid(bid) = record {
                bids_by_team
                    .entry(bid.team_name.clone())
                    .or_default()
                    .push(bid);
            }
        }

        Ok(teams
            .into_iter()
            .enumerate()
            .map(|(idx, team)| {
                let bids = bids_by_team.remove(&team.name).unwrap_or_default();
                Standing {
                    rank: idx.saturating_add(1),
                    team,
                    bids,
                }
            })
            .collect())
    }

    /// Returns the most recent trades, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn recent_trades(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<TradeRecord>, LedgerError> {
        let query = AuditQuery {
            kind: Some(AuditKind::Trade),
            limit: Some(limit.unwrap_or(self.trade_log_limit)),
            ..AuditQuery::default()
        };
        Ok(self
            .audit
            .query_all(&query)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                AuditRecord::Trade(trade) => Some(trade),
                AuditRecord::Bid(_) => None,
            })
            .collect())
    }

    /// Returns bid records matching the team/player filter in `query`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn bid_log(&self, query: AuditQuery) -> Result<Vec<BidRecord>, LedgerError> {
        let query = AuditQuery {
            kind: Some(AuditKind::Bid),
            ..query
        };
        Ok(self
            .audit
            .query_all(&query)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                AuditRecord::Bid(bid) => Some(bid),
                AuditRecord::Trade(_) => None,
            })
            .collect())
    }

    /// One attempt at a trade: fresh bid history, then validate and settle
    /// on the store's snapshot.
    async fn settle_trade(
        &self,
        seller_id: TeamId,
        buyer_id: TeamId,
        player: &str,
        amount: i64,
    ) -> Result<SettledTrade, LedgerError> {
        let bids = self.audit.query_by_player(player).await?;
        let player = player.to_string();

        self.teams
            .run_atomic(&[seller_id, buyer_id], move |teams| {
                let mut teams = teams.into_iter();
                let (Some(seller), Some(buyer)) = (teams.next(), teams.next()) else {
                    return Err(LedgerError::Internal(
                        "trade snapshot is missing a team".to_string(),
                    ));
                };
                let validated = validate_trade(&seller, &buyer, &player, amount, &bids)?;
                let settled = apply_trade(seller, buyer, &validated.entry, validated.amount)?;
                Ok(AtomicWrite::new(
                    vec![settled.seller.clone(), settled.buyer.clone()],
                    settled,
                ))
            })
            .await
    }

    /// Runs `attempt` and re-runs it after a [`LedgerError::Conflict`], up
    /// to [`CONFLICT_RETRIES`] times.
    async fn retry_on_conflict<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(LedgerError::Conflict) if retries < CONFLICT_RETRIES => {
                    retries += 1;
                    tracing::warn!(operation, retries, "commit conflict, retrying");
                }
                other => return other,
            }
        }
    }

    /// Appends to the audit log after a commit. A failure is logged and
    /// returned as a message; the commit stands.
    async fn append_audit(&self, record: AuditRecord) -> Option<String> {
        let kind = record.kind();
        match self.audit.append(record).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(?kind, error = %err, "audit append failed after commit");
                Some(err.to_string())
            }
        }
    }
}

fn non_blank(what: &str, value: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidRequest(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    use super::*;
    use crate::domain::CatalogPlayer;
    use crate::persistence::MemoryStore;

    const CRORE: i64 = 10_000_000;

    /// Memory store that counts calls, can lose its next N commits and can
    /// refuse audit appends.
    #[derive(Debug, Default)]
    struct ProbeStore {
        inner: MemoryStore,
        calls: AtomicUsize,
        conflicts: AtomicU32,
        fail_appends: bool,
    }

    impl ProbeStore {
        fn failing_audit() -> Self {
            Self {
                fail_appends: true,
                ..Self::default()
            }
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl TeamStore for ProbeStore {
        async fn get(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
            self.touch();
            self.inner.get(id).await
        }

        async fn list_all(&self) -> Result<Vec<TeamRecord>, LedgerError> {
            self.touch();
            self.inner.list_all().await
        }

        async fn insert(&self, team: TeamRecord) -> Result<TeamId, LedgerError> {
            self.touch();
            self.inner.insert(team).await
        }

        async fn remove(&self, id: TeamId) -> Result<TeamRecord, LedgerError> {
            self.touch();
            self.inner.remove(id).await
        }

        async fn run_atomic<T, F>(&self, read_set: &[TeamId], write_fn: F) -> Result<T, LedgerError>
        where
            T: Send,
            F: FnOnce(Vec<TeamRecord>) -> Result<AtomicWrite<T>, LedgerError> + Send,
        {
            self.touch();
            let pending = self.conflicts.load(Ordering::SeqCst);
            if pending > 0 {
                self.conflicts.store(pending - 1, Ordering::SeqCst);
                return Err(LedgerError::Conflict);
            }
            self.inner.run_atomic(read_set, write_fn).await
        }
    }

    impl AuditLog for ProbeStore {
        async fn append(&self, record: AuditRecord) -> Result<(), LedgerError> {
            self.touch();
            if self.fail_appends {
                return Err(LedgerError::StoreUnavailable("audit log offline".to_string()));
            }
            self.inner.append(record).await
        }

        async fn query_by_player(&self, player_name: &str) -> Result<Vec<BidRecord>, LedgerError> {
            self.touch();
            self.inner.query_by_player(player_name).await
        }

        async fn query_all(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, LedgerError> {
            self.touch();
            self.inner.query_all(query).await
        }
    }

    type ProbeService = LeagueService<Arc<ProbeStore>, Arc<ProbeStore>>;

    fn make_service(store: ProbeStore) -> (ProbeService, Arc<ProbeStore>) {
        let store = Arc::new(store);
        let catalog = PlayerCatalog::new(vec![CatalogPlayer {
            name: "Player X".to_string(),
            points: 50,
        }]);
        let service = LeagueService::new(Arc::clone(&store), Arc::clone(&store), EventBus::new(64))
            .with_catalog(catalog);
        (service, store)
    }

    async fn register(service: &ProbeService, name: &str, cash: i64) -> TeamId {
        let Ok(team) = service
            .register_team(name, Some(cash.unsigned_abs()))
            .await
        else {
            panic!("register {name} failed");
        };
        team.id
    }

    /// A (10 Cr) wins X for 2 Cr; B holds 5 Cr; C holds 5 Cr.
    async fn scenario(service: &ProbeService) -> (TeamId, TeamId, TeamId) {
        let a = register(service, "Team A", 10 * CRORE).await;
        let b = register(service, "Team B", 5 * CRORE).await;
        let c = register(service, "Team C", 5 * CRORE).await;
        let Ok(_) = service.place_bid(a, "Player X", 2 * CRORE, None).await else {
            panic!("bid failed");
        };
        (a, b, c)
    }

    #[tokio::test]
    async fn register_defaults_and_trims() {
        let (service, _) = make_service(ProbeStore::default());
        let Ok(team) = service.register_team("  Chennai Chargers ", None).await else {
            panic!("register failed");
        };
        assert_eq!(team.name, "Chennai Chargers");
        assert_eq!(team.cash, DEFAULT_TEAM_CASH);
        assert_eq!(team.points, 0);
        assert!(team.roster.is_empty());

        assert!(matches!(
            service.register_team("   ", None).await,
            Err(LedgerError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn bid_uses_catalog_points() {
        let (service, store) = make_service(ProbeStore::default());
        let (a, _, _) = scenario(&service).await;

        let Ok(team) = service.get_team(a).await else {
            panic!("team A missing");
        };
        assert_eq!(team.cash, 80_000_000);
        assert_eq!(team.points, 50);
        assert_eq!(store.inner.audit_len().await, 1);
    }

    #[tokio::test]
    async fn bid_on_uncatalogued_player_needs_points() {
        let (service, _) = make_service(ProbeStore::default());
        let a = register(&service, "Team A", CRORE).await;

        let result = service.place_bid(a, "Unknown", 1_000, None).await;
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));

        let Ok(receipt) = service.place_bid(a, "Unknown", 1_000, Some(7)).await else {
            panic!("explicit points should be accepted");
        };
        assert_eq!(receipt.team.points, 7);
    }

    #[tokio::test]
    async fn scenario_trade_then_resale_is_denied() {
        let (service, _) = make_service(ProbeStore::default());
        let (a, b, c) = scenario(&service).await;

        let Ok(receipt) = service.execute_trade(a, b, "Player X", 5_000_000).await else {
            panic!("trade should succeed");
        };
        assert_eq!(receipt.seller.cash, 85_000_000);
        assert_eq!(receipt.seller.points, 0);
        assert_eq!(receipt.buyer.cash, 45_000_000);
        assert_eq!(receipt.buyer.points, 50);
        assert!(receipt.audit_error.is_none());

        let resale = service.execute_trade(b, c, "Player X", 1_000).await;
        assert!(matches!(
            resale,
            Err(LedgerError::NotOriginalOwner { ref owner, .. }) if owner == "Team A"
        ));

        let Ok(trades) = service.recent_trades(None).await else {
            panic!("trade log");
        };
        assert_eq!(trades.len(), 1);
    }

    #[tokio::test]
    async fn negative_amount_is_rejected_before_store_access() {
        let (service, store) = make_service(ProbeStore::default());
        let (a, b, _) = scenario(&service).await;
        let before = store.calls.load(Ordering::SeqCst);

        let result = service.execute_trade(a, b, "Player X", -1).await;
        assert_eq!(result.err(), Some(LedgerError::InvalidAmount("-1".to_string())));

        let self_trade = service.execute_trade(a, a, "Player X", 1).await;
        assert_eq!(self_trade.err(), Some(LedgerError::SelfTrade));

        assert_eq!(store.calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn one_conflict_is_retried() {
        let (service, store) = make_service(ProbeStore::default());
        let (a, b, _) = scenario(&service).await;
        store.conflicts.store(1, Ordering::SeqCst);

        let result = service.execute_trade(a, b, "Player X", CRORE).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn second_conflict_surfaces() {
        let (service, store) = make_service(ProbeStore::default());
        let (a, b, _) = scenario(&service).await;
        store.conflicts.store(2, Ordering::SeqCst);

        let result = service.execute_trade(a, b, "Player X", CRORE).await;
        assert_eq!(result.err(), Some(LedgerError::Conflict));

        let Ok(seller) = service.get_team(a).await else {
            panic!("team A missing");
        };
        assert_eq!(seller.roster.len(), 1);
    }

    #[tokio::test]
    async fn failed_audit_append_keeps_commit() {
        let (service, store) = make_service(ProbeStore::failing_audit());
        let a = register(&service, "Team A", CRORE).await;

        let Ok(receipt) = service.place_bid(a, "Player X", 1_000, None).await else {
            panic!("commit should stand");
        };
        assert!(receipt.audit_error.is_some());
        assert_eq!(store.inner.audit_len().await, 0);

        let Ok(team) = service.get_team(a).await else {
            panic!("team A missing");
        };
        assert_eq!(team.roster.len(), 1);
    }

    #[tokio::test]
    async fn update_team_validates_cash_and_name() {
        let (service, _) = make_service(ProbeStore::default());
        let a = register(&service, "Team A", CRORE).await;
        let _ = register(&service, "Team B", CRORE).await;

        let negative = TeamUpdate {
            cash: Some(-5),
            ..TeamUpdate::default()
        };
        assert_eq!(
            service.update_team(a, negative).await.err(),
            Some(LedgerError::InvalidAmount("-5".to_string()))
        );

        let clash = TeamUpdate {
            name: Some("Team B".to_string()),
            ..TeamUpdate::default()
        };
        assert!(matches!(
            service.update_team(a, clash).await,
            Err(LedgerError::InvalidRequest(_))
        ));

        let edit = TeamUpdate {
            name: Some("Team Alpha".to_string()),
            cash: Some(42),
            points: Some(9),
        };
        let Ok(team) = service.update_team(a, edit).await else {
            panic!("update failed");
        };
        assert_eq!((team.name.as_str(), team.cash, team.points), ("Team Alpha", 42, 9));
    }

    #[tokio::test]
    async fn leaderboard_orders_points_then_cash_then_name() {
        let (service, _) = make_service(ProbeStore::default());
        let (a, _, _) = scenario(&service).await;
        let _ = register(&service, "Team 0", 5 * CRORE).await;
        let _ = service.place_bid(a, "Player Y", 1_000, Some(5)).await;

        let Ok(board) = service.leaderboard().await else {
            panic!("leaderboard");
        };
        let names: Vec<&str> = board.iter().map(|s| s.team.name.as_str()).collect();
        assert_eq!(names, vec!["Team A", "Team 0", "Team B", "Team C"]);

        let Some(first) = board.first() else {
            panic!("non-empty board");
        };
        assert_eq!(first.rank, 1);
        let players: Vec<&str> = first.bids.iter().map(|b| b.player_name.as_str()).collect();
        assert_eq!(players, vec!["Player Y", "Player X"]);
    }

    #[tokio::test]
    async fn remove_team_emits_event() {
        let (service, _) = make_service(ProbeStore::default());
        let a = register(&service, "Team A", CRORE).await;
        let mut rx = service.event_bus().subscribe();

        assert!(service.remove_team(a).await.is_ok());
        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "team_removed");
        assert!(matches!(
            service.get_team(a).await,
            Err(LedgerError::TeamNotFound(_))
        ));
    }

    #[tokio::test]
    async fn bid_log_filters_by_team() {
        let (service, _) = make_service(ProbeStore::default());
        let (_, b, _) = scenario(&service).await;
        let _ = service.place_bid(b, "Player Z", 1_000, Some(1)).await;

        let query = AuditQuery {
            team: Some("Team B".to_string()),
            ..AuditQuery::default()
        };
        let Ok(bids) = service.bid_log(query).await else {
            panic!("bid log");
        };
        assert_eq!(bids.len(), 1);
        assert_eq!(bids.first().map(|b| b.player_name.as_str()), Some("Player Z"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_trades_never_overdraw_the_buyer() {
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(LeagueService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            EventBus::new(256),
        ));

        let Ok(buyer) = service.register_team("Buyer", Some(17)).await else {
            panic!("register buyer");
        };
        let mut sellers = Vec::new();
        for i in 0..20 {
            let Ok(seller) = service.register_team(&format!("Seller {i}"), Some(10)).await else {
                panic!("register seller {i}");
            };
            let Ok(_) = service
                .place_bid(seller.id, &format!("Player {i}"), 1, Some(3))
                .await
            else {
                panic!("bid for seller {i}");
            };
            sellers.push(seller.id);
        }
        let total_before = 17 + 20 * 9;

        let mut tasks = tokio::task::JoinSet::new();
        for (i, seller) in sellers.into_iter().enumerate() {
            let service = Arc::clone(&service);
            let buyer = buyer.id;
            tasks.spawn(async move {
                service
                    .execute_trade(seller, buyer, &format!("Player {i}"), 5)
                    .await
            });
        }

        let (mut committed, mut paid) = (0_usize, 0_u64);
        while let Some(joined) = tasks.join_next().await {
            let Ok(result) = joined else {
                panic!("trade task panicked");
            };
            match result {
                Ok(receipt) => {
                    committed += 1;
                    paid += receipt.record.amount;
                }
                Err(LedgerError::InsufficientFunds { .. } | LedgerError::Conflict) => {}
                Err(other) => panic!("unexpected rejection: {other}"),
            }
        }
        assert!((1..=3).contains(&committed), "committed {committed}");

        let Ok(teams) = service.list_teams().await else {
            panic!("list teams");
        };
        let total_after: u64 = teams.iter().map(|t| t.cash).sum();
        assert_eq!(total_after, total_before);

        let Some(buyer) = teams.iter().find(|t| t.id == buyer.id) else {
            panic!("buyer missing");
        };
        assert_eq!(buyer.cash, 17 - paid);
        assert_eq!(buyer.roster.len(), committed);

        let Ok(trades) = service.recent_trades(Some(50)).await else {
            panic!("trade log");
        };
        assert_eq!(trades.len(), committed);
    }
}
