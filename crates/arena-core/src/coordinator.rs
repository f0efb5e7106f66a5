//! Update coordinator: the per-submission write path.
//!
//! Each submission moves through the states `Received -> Validated ->
//! Appended -> Aggregated -> Ranked -> Committed`, with `Failed`
//! reachable from any of them:
//!
//! 1. **Received**: the raw score must be a non-negative integer within
//!    the score domain and the game mode must be recognized.
//! 2. **Validated**: the player must exist in the directory. Rejection
//!    here aborts the unit with no side effects.
//! 3. **Appended/Aggregated**: the event append and the aggregate fold
//!    commit as one atomic unit under the player's lock. The fallible
//!    fold arithmetic runs *before* either mutation, so a failure
//!    leaves no partial state and a timed-out caller observes nothing.
//! 4. **Ranked**: the single-player rank update runs inline
//!    ([`RankPolicy::Synchronous`]) or on a fire-and-forget background
//!    task ([`RankPolicy::Deferred`]). Deferred failures are logged and
//!    recovered by the next full recompute; they never reach the
//!    submission caller, and cancelling the original request does not
//!    cancel the task.
//! 5. **Committed**: the caller receives the updated submission count
//!    and mean score.
//!
//! Mutations are serialized per player id by a lock table, preserving
//! the incremental-mean invariant and per-player submission order.
//! Submissions for different players proceed fully in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use arena_types::{GameMode, PlayerId, SubmitOutcome};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::aggregate::{self, AggregateStore};
use crate::config::RankPolicy;
use crate::error::LeaderboardError;
use crate::event_log::ScoreEventLog;
use crate::players::PlayerDirectory;
use crate::rank::RankIndex;

/// Per-player lock table serializing the write path.
///
/// Lock entries are created on first submission and kept for the
/// process lifetime; the table is bounded by the player population.
#[derive(Debug, Default)]
struct LockTable {
    inner: Mutex<HashMap<PlayerId, Arc<Mutex<()>>>>,
}

impl LockTable {
    /// The lock guarding one player's write path.
    async fn for_player(&self, player_id: PlayerId) -> Arc<Mutex<()>> {
        let mut table = self.inner.lock().await;
        Arc::clone(table.entry(player_id).or_default())
    }
}

/// Orchestrates the append -> aggregate -> rank sequence per submission.
pub struct UpdateCoordinator {
    directory: Arc<dyn PlayerDirectory>,
    log: ScoreEventLog,
    aggregates: AggregateStore,
    ranks: RankIndex,
    policy: RankPolicy,
    locks: LockTable,
}

impl UpdateCoordinator {
    /// Wire a coordinator over the shared engine components.
    pub(crate) fn new(
        directory: Arc<dyn PlayerDirectory>,
        log: ScoreEventLog,
        aggregates: AggregateStore,
        ranks: RankIndex,
        policy: RankPolicy,
    ) -> Self {
        Self {
            directory,
            log,
            aggregates,
            ranks,
            policy,
            locks: LockTable::default(),
        }
    }

    /// The lock serializing this player's write path.
    ///
    /// The reconciliation pass holds it while rescanning the player so
    /// a concurrent submission is either fully reflected or fully
    /// deferred, never half-applied.
    pub(crate) async fn player_lock(&self, player_id: PlayerId) -> Arc<Mutex<()>> {
        self.locks.for_player(player_id).await
    }

    /// Process one score submission end to end.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::Validation`] for a malformed score
    /// or unrecognized mode, [`LeaderboardError::NotFound`] for an
    /// unknown player. Both are rejected before any side effect.
    pub async fn submit(
        &self,
        player_id: PlayerId,
        score: i64,
        mode: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        // Received: domain-validate the raw input.
        if score < 0 {
            return Err(LeaderboardError::Validation {
                reason: format!("score must be non-negative, got {score}"),
            });
        }
        let score = u32::try_from(score).map_err(|_| LeaderboardError::Validation {
            reason: format!("score {score} exceeds the maximum of {}", u32::MAX),
        })?;
        let mode = GameMode::parse(mode).ok_or_else(|| LeaderboardError::Validation {
            reason: format!("unrecognized game mode: {mode:?}"),
        })?;

        // Validated: the player must exist before anything is written.
        if !self.directory.exists(player_id) {
            return Err(LeaderboardError::NotFound { player_id });
        }

        // The atomic unit: everything below runs under the player's
        // lock, so two submissions from the same player apply in order.
        let lock = self.locks.for_player(player_id).await;
        let _guard = lock.lock().await;

        // Fold arithmetic is the only fallible step; run it before the
        // append so a failure leaves neither event nor aggregate.
        let current = self
            .aggregates
            .get(player_id)
            .await
            .map(|e| (e.total_score, e.submissions));
        let (total_score, submissions) = aggregate::fold_mean(current, score)?;

        // Appended + Aggregated.
        let event_id = self.log.append(player_id, score, mode, timestamp).await;
        self.aggregates
            .commit(player_id, total_score, submissions)
            .await;

        // Ranked: inline or handed off, per the configured policy.
        match self.policy {
            RankPolicy::Synchronous => {
                self.ranks.update_rank(player_id).await?;
            }
            RankPolicy::Deferred => {
                let ranks = self.ranks.clone();
                tokio::spawn(async move {
                    if let Err(error) = ranks.update_rank(player_id).await {
                        tracing::error!(%player_id, %error, "deferred rank update failed");
                    }
                });
            }
        }

        // Committed.
        tracing::debug!(
            %player_id,
            %event_id,
            score,
            %mode,
            total_score = %total_score,
            submissions,
            "submission committed"
        );

        Ok(SubmitOutcome {
            player_id,
            total_submissions: submissions,
            total_score,
        })
    }
}
