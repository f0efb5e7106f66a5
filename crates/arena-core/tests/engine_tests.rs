//! End-to-end tests for the leaderboard engine facade.
//!
//! These exercise the full submit -> aggregate -> rank -> read pipeline
//! through the public [`Leaderboard`] interface, including the cache
//! staleness bound and the maintenance entry points.

// Tests use unwrap/expect freely -- panicking on failure is the correct
// behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;
use std::time::Duration;

use arena_core::{
    EngineConfig, InMemoryDirectory, Leaderboard, LeaderboardError, PlayerDirectory, RankPolicy,
};
use arena_types::PlayerId;
use chrono::Utc;
use rust_decimal::Decimal;

fn engine_with(config: EngineConfig) -> (Arc<InMemoryDirectory>, Leaderboard) {
    let directory = Arc::new(InMemoryDirectory::new());
    let engine = Leaderboard::new(Arc::clone(&directory) as Arc<dyn PlayerDirectory>, &config);
    (directory, engine)
}

fn engine() -> (Arc<InMemoryDirectory>, Leaderboard) {
    engine_with(EngineConfig {
        rank_policy: RankPolicy::Synchronous,
        cache_ttl_ms: 60_000,
        full_refresh_every: 0,
    })
}

#[tokio::test]
async fn end_to_end_scenario_with_tie() {
    let (directory, engine) = engine();
    let a = directory.register("player_a").id;
    let b = directory.register("player_b").id;
    let c = directory.register("player_c").id;

    // A submits 100 -> total 100, rank 1.
    engine.submit(a, 100, "solo", Utc::now()).await.unwrap();
    let standing_a = engine.player_rank(a).await.unwrap();
    assert_eq!(standing_a.total_score, Decimal::from(100));
    assert_eq!(standing_a.rank, 1);

    // B submits 100 -> rank 1 (tie); A unaffected at 1.
    engine.submit(b, 100, "team", Utc::now()).await.unwrap();
    assert_eq!(engine.player_rank(b).await.unwrap().rank, 1);
    assert_eq!(engine.player_rank(a).await.unwrap().rank, 1);

    // C submits 50 -> rank 3 (skips the tied count).
    engine.submit(c, 50, "solo", Utc::now()).await.unwrap();
    let standing_c = engine.player_rank(c).await.unwrap();
    assert_eq!(standing_c.total_score, Decimal::from(50));
    assert_eq!(standing_c.rank, 3);

    // Top 2 is the two rank-1 entries; C excluded.
    let top = engine.top_n(2).await;
    assert_eq!(top.len(), 2);
    assert!(top.iter().all(|row| row.rank == 1));
    assert!(top.iter().all(|row| row.player_id != c));
}

#[tokio::test]
async fn unknown_player_rejected_with_no_side_effects() {
    let (_directory, engine) = engine();
    let result = engine
        .submit(PlayerId::new(999_999), 100, "solo", Utc::now())
        .await;
    assert!(matches!(result, Err(LeaderboardError::NotFound { .. })));
    assert_eq!(engine.event_count().await, 0);
    assert!(engine.top_n(10).await.is_empty());
}

#[tokio::test]
async fn existing_player_without_scores_is_unranked() {
    let (directory, engine) = engine();
    let idle = directory.register("idle").id;
    let standing = engine.player_rank(idle).await.unwrap();
    assert_eq!(standing.rank, 0);
    assert_eq!(standing.total_score, Decimal::ZERO);
    assert_eq!(standing.total_submissions, 0);
    // Absent until first submission: not in top-N either.
    assert!(engine.top_n(10).await.is_empty());
}

#[tokio::test]
async fn incremental_then_full_recompute_leaves_ranks_unchanged() {
    let (directory, engine) = engine();
    let ids: Vec<PlayerId> = (0..8).map(|i| directory.register(&format!("p{i}")).id).collect();
    // Descending scores: each submission ranks below all previous ones,
    // so no earlier player's incremental rank goes stale.
    for (i, id) in ids.iter().enumerate() {
        let score = (8 - i64::try_from(i).unwrap()) * 10;
        engine.submit(*id, score, "solo", Utc::now()).await.unwrap();
    }

    let before: Vec<u32> = {
        let mut ranks = Vec::new();
        for id in &ids {
            ranks.push(engine.player_rank(*id).await.unwrap().rank);
        }
        ranks
    };

    let refresh = engine.recompute_all_ranks().await;
    assert_eq!(refresh.entries_ranked, 8);
    assert_eq!(refresh.drift_corrected, 0);

    for (id, expected) in ids.iter().zip(before) {
        assert_eq!(engine.player_rank(*id).await.unwrap().rank, expected);
    }
}

#[tokio::test]
async fn repeated_full_recompute_is_idempotent() {
    let (directory, engine) = engine();
    for (name, score) in [("a", 100), ("b", 100), ("c", 90)] {
        let id = directory.register(name).id;
        engine.submit(id, score, "solo", Utc::now()).await.unwrap();
    }
    let first = engine.recompute_all_ranks().await;
    let second = engine.recompute_all_ranks().await;
    assert_eq!(first.entries_ranked, second.entries_ranked);
    assert_eq!(second.drift_corrected, 0);
}

#[tokio::test(start_paused = true)]
async fn cache_staleness_is_bounded_by_ttl() {
    let (directory, engine) = engine_with(EngineConfig {
        rank_policy: RankPolicy::Synchronous,
        cache_ttl_ms: 2_000,
        full_refresh_every: 0,
    });
    let a = directory.register("a").id;
    let b = directory.register("b").id;

    engine.submit(a, 100, "solo", Utc::now()).await.unwrap();
    // Prime the cache with A on top.
    let top = engine.top_n(1).await;
    assert_eq!(top.first().map(|r| r.player_id), Some(a));

    // B takes the lead, but the cached snapshot may still show A.
    engine.submit(b, 200, "solo", Utc::now()).await.unwrap();
    let stale = engine.top_n(1).await;
    assert_eq!(stale.first().map(|r| r.player_id), Some(a));

    // Once the TTL elapses the next read reflects the submission.
    tokio::time::advance(Duration::from_millis(2_000)).await;
    let fresh = engine.top_n(1).await;
    assert_eq!(fresh.first().map(|r| r.player_id), Some(b));
}

#[tokio::test]
async fn player_rank_bypasses_the_cache() {
    let (directory, engine) = engine();
    let a = directory.register("a").id;
    engine.submit(a, 100, "solo", Utc::now()).await.unwrap();
    let _ = engine.top_n(1).await; // prime cache
    engine.submit(a, 300, "solo", Utc::now()).await.unwrap();
    // Single-player read sees the committed mean immediately.
    let standing = engine.player_rank(a).await.unwrap();
    assert_eq!(standing.total_score, Decimal::from(200));
    assert_eq!(standing.total_submissions, 2);
}

#[tokio::test]
async fn reconcile_corrects_nothing_on_a_healthy_store() {
    let (directory, engine) = engine();
    // Descending submission order keeps incremental ranks exact.
    for (name, score) in [("a", 100), ("b", 75), ("c", 50)] {
        let id = directory.register(name).id;
        engine.submit(id, score, "solo", Utc::now()).await.unwrap();
    }
    let report = engine.reconcile().await.unwrap();
    assert_eq!(report.players_rescanned, 3);
    assert_eq!(report.aggregates_corrected, 0);
    assert_eq!(report.ranks.drift_corrected, 0);
}

#[tokio::test]
async fn deferred_policy_converges_after_recompute() {
    let (directory, engine) = engine_with(EngineConfig {
        rank_policy: RankPolicy::Deferred,
        cache_ttl_ms: 60_000,
        full_refresh_every: 0,
    });
    let a = directory.register("a").id;
    engine.submit(a, 100, "solo", Utc::now()).await.unwrap();

    // The submission itself committed the aggregate.
    let standing = engine.player_rank(a).await.unwrap();
    assert_eq!(standing.total_submissions, 1);

    // Whatever the background task did, a full recompute converges.
    engine.recompute_all_ranks().await;
    assert_eq!(engine.player_rank(a).await.unwrap().rank, 1);
}

#[tokio::test]
async fn reset_clears_events_and_standings() {
    let (directory, engine) = engine();
    let a = directory.register("a").id;
    engine.submit(a, 100, "solo", Utc::now()).await.unwrap();
    engine.reset().await;
    assert_eq!(engine.event_count().await, 0);
    assert!(engine.top_n(10).await.is_empty());
    assert_eq!(engine.player_rank(a).await.unwrap().rank, 0);
}
