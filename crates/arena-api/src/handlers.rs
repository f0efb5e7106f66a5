//! REST API endpoint handlers for the leaderboard server.
//!
//! All handlers go through the engine facade in the shared
//! [`AppState`]; none touch the stores directly.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/api/leaderboard/submit` | Submit a score |
//! | `GET` | `/api/leaderboard/top` | Top-N standings (cached) |
//! | `GET` | `/api/leaderboard/rank/{id}` | Single player standing |
//! | `POST` | `/api/leaderboard/recompute` | Full rank recompute |

use std::sync::Arc;

use arena_types::{LeaderboardEntry, PlayerId, PlayerStanding};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

/// Default number of rows returned by the top endpoint.
const DEFAULT_TOP_LIMIT: usize = 10;

/// Maximum number of rows a single top request may ask for.
const MAX_TOP_LIMIT: usize = 1_000;

// ---------------------------------------------------------------------------
// Request / response schemas
// ---------------------------------------------------------------------------

/// Body of `POST /api/leaderboard/submit`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct SubmitRequest {
    /// The submitting player's id.
    pub player_id: i64,
    /// Raw score; must be non-negative.
    #[validate(range(min = 0, message = "score must be non-negative"))]
    pub score: i64,
    /// Game mode; defaults to solo when omitted.
    pub game_mode: Option<String>,
}

/// Response of `POST /api/leaderboard/submit`.
#[derive(Debug, serde::Serialize)]
pub struct SubmitResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The submitting player's id.
    pub player_id: i64,
    /// The score that was recorded.
    pub score: i64,
    /// Updated total submission count.
    pub total_submissions: u64,
    /// Updated mean score.
    pub total_score: Decimal,
}

/// Query parameters for `GET /api/leaderboard/top`.
#[derive(Debug, serde::Deserialize)]
pub struct TopQuery {
    /// Maximum number of rows to return (default 10, capped at 1000).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let events = state.engine.event_count().await;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Arena Leaderboard</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Arena Leaderboard</h1>
    <p class="subtitle">Score aggregation and ranking service</p>
    <p>Status: <span class="status">RUNNING</span></p>
    <div class="metric">
        <div class="label">Score events</div>
        <div class="value">{events}</div>
    </div>
    <ul>
        <li><a href="/api/leaderboard/top">/api/leaderboard/top</a></li>
        <li><a href="/health">/health</a></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
#[allow(clippy::unused_async)] // Axum handlers must be async
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ---------------------------------------------------------------------------
// POST /api/leaderboard/submit
// ---------------------------------------------------------------------------

/// Submit a score for a player.
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let mode = request.game_mode.as_deref().unwrap_or("solo");
    let outcome = state
        .engine
        .submit(
            PlayerId::new(request.player_id),
            request.score,
            mode,
            Utc::now(),
        )
        .await?;

    Ok(Json(SubmitResponse {
        message: String::from("Score submitted successfully"),
        player_id: request.player_id,
        score: request.score,
        total_submissions: outcome.total_submissions,
        total_score: outcome.total_score,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/leaderboard/top
// ---------------------------------------------------------------------------

/// The top-N standings, served through the TTL read cache.
pub async fn top(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    if limit > MAX_TOP_LIMIT {
        return Err(ApiError::InvalidRequest(format!(
            "limit {limit} exceeds the maximum of {MAX_TOP_LIMIT}"
        )));
    }
    Ok(Json(state.engine.top_n(limit).await))
}

// ---------------------------------------------------------------------------
// GET /api/leaderboard/rank/{id}
// ---------------------------------------------------------------------------

/// A single player's standing. Always read-through, never cached.
pub async fn player_rank(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PlayerStanding>, ApiError> {
    let standing = state.engine.player_rank(PlayerId::new(id)).await?;
    Ok(Json(standing))
}

// ---------------------------------------------------------------------------
// POST /api/leaderboard/recompute
// ---------------------------------------------------------------------------

/// Administrative full rank recompute. Idempotent.
pub async fn recompute(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let refresh = state.engine.recompute_all_ranks().await;
    Json(serde_json::json!({
        "entries_ranked": refresh.entries_ranked,
        "drift_corrected": refresh.drift_corrected,
    }))
}
