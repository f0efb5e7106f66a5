//! Append-only score event log.
//!
//! Every accepted submission becomes an immutable [`ScoreEvent`] here.
//! The log is the source of truth for the aggregate rescan: the mean
//! kept incrementally in the aggregate store must always equal the mean
//! recomputed from this history. There is no update or delete in the
//! steady-state API; [`clear`](ScoreEventLog::clear) exists only for
//! the administrative reset.
//!
//! The update coordinator is the only writer.

use std::collections::BTreeMap;
use std::sync::Arc;

use arena_types::{EventId, GameMode, PlayerId, ScoreEvent};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Interior state of the event log.
#[derive(Debug, Default)]
struct LogState {
    next_id: i64,
    by_player: BTreeMap<PlayerId, Vec<ScoreEvent>>,
    total: u64,
}

/// In-memory append-only log of score events, indexed by player.
///
/// Cheap to clone; clones share the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct ScoreEventLog {
    inner: Arc<RwLock<LogState>>,
}

impl ScoreEventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a score event and return its assigned id.
    ///
    /// Events for one player are stored in append order; the per-player
    /// lock held by the coordinator guarantees no reordering between
    /// two submissions from the same player.
    pub async fn append(
        &self,
        player_id: PlayerId,
        score: u32,
        mode: GameMode,
        timestamp: DateTime<Utc>,
    ) -> EventId {
        let mut state = self.inner.write().await;
        state.next_id = state.next_id.checked_add(1).unwrap_or(i64::MAX);
        let id = EventId::new(state.next_id);
        let event = ScoreEvent {
            id,
            player_id,
            score,
            mode,
            timestamp,
        };
        state.by_player.entry(player_id).or_default().push(event);
        state.total = state.total.saturating_add(1);
        id
    }

    /// All events for one player, in append order.
    pub async fn events_for(&self, player_id: PlayerId) -> Vec<ScoreEvent> {
        self.inner
            .read()
            .await
            .by_player
            .get(&player_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Ids of every player with at least one event.
    pub async fn player_ids(&self) -> Vec<PlayerId> {
        self.inner.read().await.by_player.keys().copied().collect()
    }

    /// Total number of events across all players.
    pub async fn len(&self) -> u64 {
        self.inner.read().await.total
    }

    /// Whether the log holds no events.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Administrative reset: drop all events.
    ///
    /// Not part of the steady-state contract. Event id numbering is
    /// deliberately not reset so ids never repeat within a process.
    pub async fn clear(&self) {
        let mut state = self.inner.write().await;
        state.by_player.clear();
        state.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_assigns_sequential_event_ids() {
        let log = ScoreEventLog::new();
        let a = log.append(PlayerId::new(1), 100, GameMode::Solo, Utc::now()).await;
        let b = log.append(PlayerId::new(2), 50, GameMode::Team, Utc::now()).await;
        assert_eq!(a, EventId::new(1));
        assert_eq!(b, EventId::new(2));
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn events_kept_in_submission_order() {
        let log = ScoreEventLog::new();
        let player = PlayerId::new(1);
        for score in [10, 20, 30] {
            log.append(player, score, GameMode::Solo, Utc::now()).await;
        }
        let events = log.events_for(player).await;
        let scores: Vec<u32> = events.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn clear_drops_events_but_not_id_sequence() {
        let log = ScoreEventLog::new();
        log.append(PlayerId::new(1), 10, GameMode::Solo, Utc::now()).await;
        log.clear().await;
        assert!(log.is_empty().await);
        let next = log.append(PlayerId::new(1), 10, GameMode::Solo, Utc::now()).await;
        assert_eq!(next, EventId::new(2));
    }
}
