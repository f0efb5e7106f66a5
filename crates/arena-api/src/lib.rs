//! HTTP API server for the Arena leaderboard.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Score submission** (`POST /api/leaderboard/submit`) feeding the
//!   engine's update pipeline
//! - **Standings reads**: the cached top-N view
//!   (`GET /api/leaderboard/top`) and the uncached single-player
//!   standing (`GET /api/leaderboard/rank/{id}`)
//! - **Administrative recompute** (`POST /api/leaderboard/recompute`)
//!   forcing a full rank pass
//! - **Minimal HTML status page** (`GET /`) showing the event count and
//!   links to the API endpoints
//!
//! # Architecture
//!
//! Handlers hold no logic of their own: each one validates its input,
//! calls the [`Leaderboard`](arena_core::Leaderboard) facade in the
//! shared [`AppState`], and maps the engine's error taxonomy onto HTTP
//! status codes through [`ApiError`](error::ApiError).

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
