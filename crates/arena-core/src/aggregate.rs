//! Aggregate store: one derived summary row per player.
//!
//! The canonical aggregation rule is the **mean of all-time scores**.
//! The source system carried two divergent rules in parallel paths
//! (running sum vs. arithmetic mean); this engine standardizes on the
//! mean, which rewards consistency over submission volume. The sum
//! variant is a documented, rejected alternative (see `DESIGN.md`).
//!
//! Two paths produce `total_score` and must always agree:
//!
//! - [`fold_mean`] -- the incremental production path, folding one new
//!   score into the running (mean, count) pair without rescanning
//!   history
//! - [`mean_of`] -- the full rescan from the event log, used as a
//!   periodic consistency backstop against drift
//!
//! All arithmetic uses checked [`Decimal`] operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use arena_types::{AggregateEntry, PlayerId, ScoreEvent};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::LeaderboardError;

/// Shared aggregate table, visible to the rank index.
pub(crate) type SharedAggregates = Arc<RwLock<BTreeMap<PlayerId, AggregateEntry>>>;

/// Fold one new score into a running (mean, count) pair.
///
/// `current` is `None` for a player's first submission. The update is
/// `new_mean = old_mean + (score - old_mean) / (count + 1)`, computed
/// in [`Decimal`] arithmetic.
///
/// # Errors
///
/// Returns [`LeaderboardError::Arithmetic`] if a checked operation
/// overflows (unreachable with domain-validated `u32` scores).
pub fn fold_mean(
    current: Option<(Decimal, u64)>,
    score: u32,
) -> Result<(Decimal, u64), LeaderboardError> {
    let Some((mean, count)) = current else {
        return Ok((Decimal::from(score), 1));
    };

    let new_count = count.checked_add(1).ok_or_else(|| LeaderboardError::Arithmetic {
        context: String::from("submission count overflow"),
    })?;
    let delta = Decimal::from(score)
        .checked_sub(mean)
        .ok_or_else(|| LeaderboardError::Arithmetic {
            context: String::from("mean delta overflow"),
        })?;
    let step = delta
        .checked_div(Decimal::from(new_count))
        .ok_or_else(|| LeaderboardError::Arithmetic {
            context: String::from("mean step division"),
        })?;
    let new_mean = mean
        .checked_add(step)
        .ok_or_else(|| LeaderboardError::Arithmetic {
            context: String::from("mean fold overflow"),
        })?;

    Ok((new_mean, new_count))
}

/// Compute the mean score of a player's full event history.
///
/// # Errors
///
/// Returns [`LeaderboardError::Arithmetic`] if the sum overflows.
pub fn mean_of(events: &[ScoreEvent]) -> Result<Decimal, LeaderboardError> {
    if events.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let mut sum = Decimal::ZERO;
    for event in events {
        sum = sum
            .checked_add(Decimal::from(event.score))
            .ok_or_else(|| LeaderboardError::Arithmetic {
                context: String::from("score sum overflow"),
            })?;
    }
    sum.checked_div(Decimal::from(events.len()))
        .ok_or_else(|| LeaderboardError::Arithmetic {
            context: String::from("mean division"),
        })
}

/// Outcome of a per-player rescan against the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescanOutcome {
    /// The freshly recomputed entry now stored.
    pub entry: AggregateEntry,
    /// Whether the stored value disagreed with the rescan (drift).
    pub corrected: bool,
}

/// The mutable aggregate table: one [`AggregateEntry`] per player with
/// at least one score event.
///
/// Rows are created on a player's first submission, updated on every
/// subsequent one, and never deleted except by the administrative
/// reset. Only the update coordinator mutates this store, in lock-step
/// with the event that triggered the change.
///
/// Cheap to clone; clones share the same underlying table.
#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    entries: SharedAggregates,
}

impl AggregateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared table, for constructing the rank index.
    pub(crate) fn shared(&self) -> SharedAggregates {
        Arc::clone(&self.entries)
    }

    /// The current entry for a player, if any.
    pub async fn get(&self, player_id: PlayerId) -> Option<AggregateEntry> {
        self.entries.read().await.get(&player_id).cloned()
    }

    /// Upsert a player's aggregate with a freshly folded value.
    ///
    /// Preserves any existing rank; a new row starts unranked until the
    /// rank index assigns one.
    pub async fn commit(
        &self,
        player_id: PlayerId,
        total_score: Decimal,
        submissions: u64,
    ) -> AggregateEntry {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(player_id)
            .and_modify(|e| {
                e.total_score = total_score;
                e.submissions = submissions;
            })
            .or_insert(AggregateEntry {
                player_id,
                total_score,
                submissions,
                rank: None,
            });
        entry.clone()
    }

    /// Recompute one player's aggregate from their full event history.
    ///
    /// This is the consistency backstop for the incremental fold. The
    /// stored rank is preserved; rank correction is the job of the full
    /// rank recompute that follows a rescan pass.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::Arithmetic`] if the rescan math
    /// overflows.
    pub async fn rescan(
        &self,
        player_id: PlayerId,
        events: &[ScoreEvent],
    ) -> Result<RescanOutcome, LeaderboardError> {
        let total_score = mean_of(events)?;
        let submissions = u64::try_from(events.len()).unwrap_or(u64::MAX);

        let mut entries = self.entries.write().await;
        let previous = entries.get(&player_id).cloned();
        let corrected = previous.as_ref().is_none_or(|e| {
            e.total_score != total_score || e.submissions != submissions
        });
        let entry = AggregateEntry {
            player_id,
            total_score,
            submissions,
            rank: previous.and_then(|e| e.rank),
        };
        entries.insert(player_id, entry.clone());

        if corrected {
            tracing::warn!(
                %player_id,
                total_score = %entry.total_score,
                submissions = entry.submissions,
                "aggregate drift corrected by rescan"
            );
        }

        Ok(RescanOutcome { entry, corrected })
    }

    /// The top `n` entries, sorted by `total_score` descending.
    ///
    /// Ties are broken by ascending player id so the output order is
    /// deterministic; tied players carry the same rank either way.
    pub async fn top(&self, n: usize) -> Vec<AggregateEntry> {
        let entries = self.entries.read().await;
        let mut rows: Vec<AggregateEntry> = entries.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then(a.player_id.cmp(&b.player_id))
        });
        rows.truncate(n);
        rows
    }

    /// Number of players with an aggregate row.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store has no rows.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Administrative reset: drop all rows.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
