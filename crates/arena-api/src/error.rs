//! Error types for the leaderboard API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can
//! be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! engine's taxonomy maps onto status codes: validation failures are
//! 400, unknown players are 404, transient storage failures are 500.

use arena_core::LeaderboardError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body or parameters failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LeaderboardError> for ApiError {
    fn from(error: LeaderboardError) -> Self {
        match error {
            LeaderboardError::Validation { reason } => Self::InvalidRequest(reason),
            LeaderboardError::NotFound { player_id } => {
                Self::NotFound(format!("player {player_id} not found"))
            }
            LeaderboardError::Storage { message } => Self::Internal(message),
            LeaderboardError::Arithmetic { context } => Self::Internal(context),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
