//! Axum router construction for the leaderboard API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the leaderboard server.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page + liveness
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Leaderboard API
        .route("/api/leaderboard/submit", post(handlers::submit_score))
        .route("/api/leaderboard/top", get(handlers::top))
        .route("/api/leaderboard/rank/{id}", get(handlers::player_rank))
        .route("/api/leaderboard/recompute", post(handlers::recompute))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
