//! Rank index: competition ranks derived from the aggregate table.
//!
//! Competition ranking: tied scores share a rank, and the next distinct
//! score's rank is one plus the count of strictly greater entries, so
//! scores `[100, 100, 90]` rank `[1, 1, 3]`.
//!
//! Two maintenance paths exist with different correctness envelopes:
//!
//! - [`update_rank`](RankIndex::update_rank) re-ranks exactly one
//!   player after a submission. It never renumbers anyone else, which
//!   is correct for the target player but can leave *other* players'
//!   ranks stale when ties or near-ties were disturbed. This is
//!   accepted bounded staleness: locally correct, globally eventually
//!   correct.
//! - [`recompute_all`](RankIndex::recompute_all) reassigns every rank
//!   from a sorted scan and replaces the table atomically with respect
//!   to readers. It is the source of truth, runs as a periodic
//!   maintenance job, and corrects whatever the incremental path left
//!   behind.

use arena_types::PlayerId;
use rust_decimal::Decimal;

use crate::aggregate::SharedAggregates;
use crate::error::LeaderboardError;

/// Summary of a full rank recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct RankRefresh {
    /// Number of entries that received a rank.
    pub entries_ranked: u64,
    /// Entries whose stored rank disagreed with the scratch computation.
    ///
    /// Non-zero values are consistency drift: logged, corrected by the
    /// freshly computed ranks, never fatal.
    pub drift_corrected: u64,
}

/// Assign competition ranks to entries already sorted by score descending.
///
/// The rank counter only advances at a strict score decrease; tied
/// entries inherit the rank of the first member of their group.
pub(crate) fn assign_competition_ranks(sorted: &[(PlayerId, Decimal)]) -> Vec<(PlayerId, u32)> {
    let mut ranked = Vec::with_capacity(sorted.len());
    let mut current_rank = 1_u32;
    let mut previous: Option<Decimal> = None;

    for (position, (player_id, score)) in sorted.iter().enumerate() {
        if previous.is_some_and(|p| *score < p) {
            current_rank = u32::try_from(position.saturating_add(1)).unwrap_or(u32::MAX);
        }
        previous = Some(*score);
        ranked.push((*player_id, current_rank));
    }

    ranked
}

/// Rank maintenance over the shared aggregate table.
///
/// Cheap to clone; clones share the table with the aggregate store.
#[derive(Debug, Clone)]
pub struct RankIndex {
    entries: SharedAggregates,
}

impl RankIndex {
    /// Create a rank index over the given aggregate table.
    pub(crate) const fn new(entries: SharedAggregates) -> Self {
        Self { entries }
    }

    /// Incrementally re-rank a single player.
    ///
    /// Counts entries with a strictly greater `total_score` and stores
    /// `count + 1` as the player's rank. Cost is one scan of the
    /// aggregate table; no other player is renumbered.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::NotFound`] if the player has no
    /// aggregate row.
    pub async fn update_rank(&self, player_id: PlayerId) -> Result<u32, LeaderboardError> {
        let mut entries = self.entries.write().await;
        let score = entries
            .get(&player_id)
            .map(|e| e.total_score)
            .ok_or(LeaderboardError::NotFound { player_id })?;

        let higher = entries
            .values()
            .filter(|e| e.total_score > score)
            .count();
        let rank = u32::try_from(higher.saturating_add(1)).unwrap_or(u32::MAX);

        if let Some(entry) = entries.get_mut(&player_id) {
            entry.rank = Some(rank);
        }

        tracing::debug!(%player_id, rank, "incremental rank update");
        Ok(rank)
    }

    /// Recompute every rank from a sorted scan of the aggregate table.
    ///
    /// Holds the table's write lock for the whole pass, so no reader
    /// ever observes a half-updated rank table and two recomputes can
    /// never interleave. Idempotent: running it twice with no
    /// intervening submissions assigns identical ranks.
    pub async fn recompute_all(&self) -> RankRefresh {
        let mut entries = self.entries.write().await;

        let mut sorted: Vec<(PlayerId, Decimal)> = entries
            .values()
            .map(|e| (e.player_id, e.total_score))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut refresh = RankRefresh::default();
        for (player_id, rank) in assign_competition_ranks(&sorted) {
            if let Some(entry) = entries.get_mut(&player_id) {
                if entry.rank != Some(rank) {
                    refresh.drift_corrected = refresh.drift_corrected.saturating_add(1);
                }
                entry.rank = Some(rank);
                refresh.entries_ranked = refresh.entries_ranked.saturating_add(1);
            }
        }

        if refresh.drift_corrected > 0 {
            tracing::warn!(
                drift = refresh.drift_corrected,
                ranked = refresh.entries_ranked,
                "full recompute corrected rank drift"
            );
        } else {
            tracing::debug!(ranked = refresh.entries_ranked, "full rank recompute");
        }

        refresh
    }
}
