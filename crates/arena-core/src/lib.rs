//! Score aggregation and rank-maintenance engine for the Arena
//! leaderboard.
//!
//! This crate turns a stream of score-submission events into a
//! consistent, queryable ranking. The HTTP layer, durable storage, and
//! identity subsystem are external collaborators; they call in through
//! the [`Leaderboard`] facade.
//!
//! # Architecture
//!
//! ```text
//! submit(player, score, mode, ts)
//!     |
//!     v
//! UpdateCoordinator (per-player serialization)
//!     |-- append  ------> ScoreEventLog   (immutable facts)
//!     |-- fold mean ----> AggregateStore  (one summary row per player)
//!     +-- update rank --> RankIndex       (competition ranks, O(1) query)
//!
//! top_n(n)  -> TopCache (TTL hit) or AggregateStore + directory (miss)
//! player_rank(id) -> AggregateStore directly (never cached)
//! ```
//!
//! # Modules
//!
//! - [`event_log`] -- append-only score event log
//! - [`aggregate`] -- mean-of-all-time-scores aggregate store
//! - [`rank`] -- competition rank index (incremental + full recompute)
//! - [`coordinator`] -- the per-submission write path
//! - [`cache`] -- TTL read cache for top-N standings
//! - [`players`] -- player directory seam to the identity subsystem
//! - [`config`] -- typed configuration and YAML loader
//! - [`error`] -- engine error taxonomy

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event_log;
pub mod players;
pub mod rank;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arena_types::{LeaderboardEntry, PlayerId, PlayerStanding, SubmitOutcome};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

pub use crate::aggregate::AggregateStore;
pub use crate::cache::TopCache;
pub use crate::config::{ArenaConfig, ConfigError, EngineConfig, RankPolicy};
pub use crate::coordinator::UpdateCoordinator;
pub use crate::error::LeaderboardError;
pub use crate::event_log::ScoreEventLog;
pub use crate::players::{InMemoryDirectory, PlayerDirectory};
pub use crate::rank::{RankIndex, RankRefresh};

/// Summary of a reconciliation pass over the full event history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ReconcileReport {
    /// Players whose aggregates were rescanned from the event log.
    pub players_rescanned: u64,
    /// Aggregates whose stored value disagreed with the rescan.
    pub aggregates_corrected: u64,
    /// The rank recompute that followed the rescan.
    pub ranks: RankRefresh,
}

/// The leaderboard engine facade.
///
/// Owns the event log, aggregate store, rank index, read cache, and
/// update coordinator, and exposes the narrow interface the outer
/// layers call: [`submit`](Self::submit), [`top_n`](Self::top_n),
/// [`player_rank`](Self::player_rank), and the maintenance entry
/// points.
pub struct Leaderboard {
    directory: Arc<dyn PlayerDirectory>,
    log: ScoreEventLog,
    aggregates: AggregateStore,
    ranks: RankIndex,
    cache: TopCache,
    coordinator: UpdateCoordinator,
    maintenance: Arc<Mutex<()>>,
    submissions: AtomicU64,
    full_refresh_every: u64,
}

impl Leaderboard {
    /// Build an engine over the given player directory.
    pub fn new(directory: Arc<dyn PlayerDirectory>, config: &EngineConfig) -> Self {
        let log = ScoreEventLog::new();
        let aggregates = AggregateStore::new();
        let ranks = RankIndex::new(aggregates.shared());
        let coordinator = UpdateCoordinator::new(
            Arc::clone(&directory),
            log.clone(),
            aggregates.clone(),
            ranks.clone(),
            config.rank_policy,
        );
        Self {
            directory,
            log,
            aggregates,
            ranks,
            cache: TopCache::new(Duration::from_millis(config.cache_ttl_ms)),
            coordinator,
            maintenance: Arc::new(Mutex::new(())),
            submissions: AtomicU64::new(0),
            full_refresh_every: config.full_refresh_every,
        }
    }

    /// Submit a score for a player.
    ///
    /// Every `full_refresh_every`-th accepted submission also schedules
    /// a deferred full rank recompute as drift correction for the
    /// incremental rank path.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::Validation`] or
    /// [`LeaderboardError::NotFound`]; both reject before any side
    /// effect.
    pub async fn submit(
        &self,
        player_id: PlayerId,
        score: i64,
        mode: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        let outcome = self
            .coordinator
            .submit(player_id, score, mode, timestamp)
            .await?;

        let accepted = self.submissions.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        if self.full_refresh_every > 0
            && accepted.checked_rem(self.full_refresh_every) == Some(0)
        {
            let ranks = self.ranks.clone();
            let guard = Arc::clone(&self.maintenance);
            tokio::spawn(async move {
                let _held = guard.lock().await;
                let refresh = ranks.recompute_all().await;
                tracing::info!(
                    ranked = refresh.entries_ranked,
                    drift = refresh.drift_corrected,
                    "scheduled full rank refresh"
                );
            });
        }

        Ok(outcome)
    }

    /// The top `n` standings, served through the TTL read cache.
    ///
    /// A result cached before a recent submission may be returned until
    /// its TTL lapses; this bounded staleness is the documented
    /// trade-off for shielding the aggregate table from read
    /// amplification. Players with no submissions never appear.
    pub async fn top_n(&self, n: usize) -> Vec<LeaderboardEntry> {
        if n == 0 {
            return Vec::new();
        }
        if let Some(rows) = self.cache.get(n).await {
            return rows;
        }

        let mut rows = Vec::with_capacity(n);
        for entry in self.aggregates.top(n).await {
            let Some(username) = self.directory.username(entry.player_id) else {
                // Aggregates must always reference a live identity row;
                // skip and flag rather than surface a nameless entry.
                tracing::warn!(player_id = %entry.player_id, "aggregate without identity record");
                continue;
            };
            rows.push(LeaderboardEntry {
                player_id: entry.player_id,
                username,
                total_score: entry.total_score,
                rank: entry.rank.unwrap_or(0),
            });
        }

        self.cache.put(n, rows.clone()).await;
        rows
    }

    /// A single player's standing. Always read-through, never cached:
    /// a player checking their own rank right after submitting should
    /// see the committed value.
    ///
    /// A player who exists but has never submitted gets the defined
    /// unranked result (rank 0, zero score, zero submissions).
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::NotFound`] if the player does not
    /// exist at all.
    pub async fn player_rank(
        &self,
        player_id: PlayerId,
    ) -> Result<PlayerStanding, LeaderboardError> {
        let username = self
            .directory
            .username(player_id)
            .ok_or(LeaderboardError::NotFound { player_id })?;

        Ok(self.aggregates.get(player_id).await.map_or_else(
            || PlayerStanding {
                player_id,
                username: username.clone(),
                rank: 0,
                total_score: Decimal::ZERO,
                total_submissions: 0,
            },
            |entry| PlayerStanding {
                player_id,
                username: username.clone(),
                rank: entry.rank.unwrap_or(0),
                total_score: entry.total_score,
                total_submissions: entry.submissions,
            },
        ))
    }

    /// Maintenance entry point: recompute every rank from scratch.
    ///
    /// Idempotent and safe to run repeatedly; self-exclusive with other
    /// maintenance passes.
    pub async fn recompute_all_ranks(&self) -> RankRefresh {
        let _held = self.maintenance.lock().await;
        self.ranks.recompute_all().await
    }

    /// Consistency backstop: rescan every aggregate from the event log,
    /// then recompute all ranks.
    ///
    /// Detected drift is logged and corrected, never fatal. Each player
    /// is rescanned under their submission lock so a concurrent write
    /// is either fully reflected or fully deferred.
    pub async fn reconcile(&self) -> Result<ReconcileReport, LeaderboardError> {
        let _held = self.maintenance.lock().await;
        let mut report = ReconcileReport::default();

        for player_id in self.log.player_ids().await {
            let lock = self.coordinator.player_lock(player_id).await;
            let _guard = lock.lock().await;
            let events = self.log.events_for(player_id).await;
            let outcome = self.aggregates.rescan(player_id, &events).await?;
            report.players_rescanned = report.players_rescanned.saturating_add(1);
            if outcome.corrected {
                report.aggregates_corrected = report.aggregates_corrected.saturating_add(1);
            }
        }

        report.ranks = self.ranks.recompute_all().await;
        tracing::info!(
            rescanned = report.players_rescanned,
            corrected = report.aggregates_corrected,
            drift = report.ranks.drift_corrected,
            "reconciliation pass complete"
        );
        Ok(report)
    }

    /// Administrative reset: drop all events, aggregates, and cached
    /// reads. Not a steady-state operation.
    pub async fn reset(&self) {
        let _held = self.maintenance.lock().await;
        self.log.clear().await;
        self.aggregates.clear().await;
        self.cache.clear().await;
        tracing::warn!("leaderboard reset: event log and aggregates cleared");
    }

    /// Total number of score events accepted since startup (or reset).
    pub async fn event_count(&self) -> u64 {
        self.log.len().await
    }

    /// Handle to the player directory this engine was built over.
    pub fn directory(&self) -> Arc<dyn PlayerDirectory> {
        Arc::clone(&self.directory)
    }
}
