//! Time-bounded read cache for top-N standings.
//!
//! Top-N reads are far more frequent than writes, so the standings
//! query is shielded by a TTL cache keyed by `n`. There is no active
//! invalidation on write: the TTL alone bounds staleness, a deliberate
//! latency/consistency trade-off for a leaderboard display. A read
//! immediately after a submission may return the pre-submission
//! ordering, but never for longer than the configured TTL.
//!
//! Single-player rank lookups bypass this cache entirely; staleness is
//! more visible to a player checking their own standing right after
//! submitting.
//!
//! The cache is an injectable component with an explicit TTL, not
//! ambient global state, and is disposable: clearing it at any time
//! costs only a latency blip on the next read.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arena_types::LeaderboardEntry;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// One cached top-N result.
#[derive(Debug, Clone)]
struct Slot {
    rows: Vec<LeaderboardEntry>,
    stored_at: Instant,
}

/// TTL cache of top-N query results, keyed by `n`.
///
/// Cheap to clone; clones share the same slots.
#[derive(Debug, Clone)]
pub struct TopCache {
    ttl: Duration,
    slots: Arc<RwLock<HashMap<usize, Slot>>>,
}

impl TopCache {
    /// Create a cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The configured time-to-live.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached rows for `n`, if present and not expired.
    pub async fn get(&self, n: usize) -> Option<Vec<LeaderboardEntry>> {
        let slots = self.slots.read().await;
        let slot = slots.get(&n)?;
        if slot.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(slot.rows.clone())
    }

    /// Store a fresh result for `n`, resetting its TTL window.
    pub async fn put(&self, n: usize, rows: Vec<LeaderboardEntry>) {
        let mut slots = self.slots.write().await;
        slots.insert(
            n,
            Slot {
                rows,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every cached result.
    ///
    /// Safe at any time; the cache is derived state with no
    /// correctness impact beyond a refill on the next read.
    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use arena_types::PlayerId;
    use rust_decimal::Decimal;

    use super::*;

    fn row(id: i64, score: i64, rank: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            player_id: PlayerId::new(id),
            username: format!("player_{id}"),
            total_score: Decimal::from(score),
            rank,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl() {
        let cache = TopCache::new(Duration::from_secs(60));
        cache.put(10, vec![row(1, 100, 1)]).await;
        tokio::time::advance(Duration::from_secs(59)).await;
        let hit = cache.get(10).await;
        assert!(matches!(hit, Some(rows) if rows.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn miss_after_ttl_elapses() {
        let cache = TopCache::new(Duration::from_secs(60));
        cache.put(10, vec![row(1, 100, 1)]).await;
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(cache.get(10).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let cache = TopCache::new(Duration::from_secs(60));
        cache.put(5, vec![row(1, 100, 1)]).await;
        assert!(cache.get(10).await.is_none());
        assert!(cache.get(5).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn put_resets_the_window() {
        let cache = TopCache::new(Duration::from_secs(60));
        cache.put(10, vec![row(1, 100, 1)]).await;
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.put(10, vec![row(2, 90, 1)]).await;
        tokio::time::advance(Duration::from_secs(45)).await;
        let hit = cache.get(10).await;
        assert!(matches!(hit, Some(rows) if rows.first().map(|r| r.player_id) == Some(PlayerId::new(2))));
    }

    #[tokio::test]
    async fn clear_empties_all_slots() {
        let cache = TopCache::new(Duration::from_secs(60));
        cache.put(5, vec![row(1, 100, 1)]).await;
        cache.put(10, vec![row(1, 100, 1)]).await;
        cache.clear().await;
        assert!(cache.get(5).await.is_none());
        assert!(cache.get(10).await.is_none());
    }
}
