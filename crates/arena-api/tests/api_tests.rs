//! Integration tests for the leaderboard API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use arena_api::router::build_router;
use arena_api::state::AppState;
use arena_core::{EngineConfig, InMemoryDirectory, Leaderboard, PlayerDirectory};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

/// Three registered players (ids 1, 2, 3), no scores yet.
fn make_test_state() -> Arc<AppState> {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.register("alice");
    directory.register("bob");
    directory.register("carol");

    let engine = Leaderboard::new(
        Arc::clone(&directory) as Arc<dyn PlayerDirectory>,
        &EngineConfig::default(),
    );
    AppState::shared(engine)
}

fn submit_request(player_id: i64, score: i64) -> Request<Body> {
    let body = serde_json::json!({ "player_id": player_id, "score": score });
    Request::post("/api/leaderboard/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_health() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_submit_score() {
    let router = build_router(make_test_state());

    let response = router.oneshot(submit_request(1, 100)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["player_id"], 1);
    assert_eq!(json["score"], 100);
    assert_eq!(json["total_submissions"], 1);
    assert_eq!(json["total_score"], "100");
}

#[tokio::test]
async fn test_submit_updates_mean() {
    let router = build_router(make_test_state());

    let response = router
        .clone()
        .oneshot(submit_request(1, 100))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router.oneshot(submit_request(1, 50)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_submissions"], 2);
    assert_eq!(json["total_score"], "75");
}

#[tokio::test]
async fn test_submit_unknown_player_returns_404() {
    let router = build_router(make_test_state());

    let response = router.oneshot(submit_request(999, 100)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_submit_negative_score_returns_400() {
    let router = build_router(make_test_state());

    let response = router.oneshot(submit_request(1, -5)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_invalid_game_mode_returns_400() {
    let router = build_router(make_test_state());

    let body = serde_json::json!({
        "player_id": 1,
        "score": 100,
        "game_mode": "battle-royale",
    });
    let response = router
        .oneshot(
            Request::post("/api/leaderboard/submit")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_top_ties_share_rank() {
    let router = build_router(make_test_state());

    for (player, score) in [(1, 100), (2, 100), (3, 50)] {
        let response = router
            .clone()
            .oneshot(submit_request(player, score))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(
            Request::get("/api/leaderboard/top")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["username"], "alice");
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[1]["username"], "bob");
    assert_eq!(rows[1]["rank"], 1);
    assert_eq!(rows[2]["username"], "carol");
    assert_eq!(rows[2]["rank"], 3);
}

#[tokio::test]
async fn test_top_respects_limit() {
    let router = build_router(make_test_state());

    for (player, score) in [(1, 300), (2, 200), (3, 100)] {
        let response = router
            .clone()
            .oneshot(submit_request(player, score))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(
            Request::get("/api/leaderboard/top?limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["username"], "alice");
    assert_eq!(rows[1]["username"], "bob");
}

#[tokio::test]
async fn test_top_limit_over_cap_returns_400() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/leaderboard/top?limit=5000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_player_rank() {
    let router = build_router(make_test_state());

    // Bob submits first so alice's incremental rank lands at 2.
    for (player, score) in [(2, 200), (1, 100)] {
        let response = router
            .clone()
            .oneshot(submit_request(player, score))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(
            Request::get("/api/leaderboard/rank/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["username"], "alice");
    assert_eq!(json["rank"], 2);
    assert_eq!(json["total_score"], "100");
    assert_eq!(json["total_submissions"], 1);
}

#[tokio::test]
async fn test_player_rank_without_scores_is_unranked() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/leaderboard/rank/2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["username"], "bob");
    assert_eq!(json["rank"], 0);
    assert_eq!(json["total_submissions"], 0);
}

#[tokio::test]
async fn test_player_rank_unknown_player_returns_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/leaderboard/rank/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recompute() {
    let router = build_router(make_test_state());

    // Descending scores keep every incremental rank globally correct.
    for (player, score) in [(1, 200), (2, 100)] {
        let response = router
            .clone()
            .oneshot(submit_request(player, score))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(
            Request::post("/api/leaderboard/recompute")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["entries_ranked"], 2);
    assert_eq!(json["drift_corrected"], 0);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
