//! Error types for the leaderboard engine.
//!
//! The taxonomy mirrors how failures are handled: [`Validation`] and
//! [`NotFound`] are rejected before any side effect, [`Storage`] is the
//! transient class a caller may retry (the failed unit rolls back in
//! full), and [`Arithmetic`] marks a checked-arithmetic overflow that
//! should never occur with domain-validated scores.
//!
//! Rank drift detected by the full recompute is not an error: it is
//! logged, corrected by the freshly computed ranks, and reported in
//! [`RankRefresh`](crate::rank::RankRefresh). Deferred rank-update
//! failures are likewise logged and recovered by the next scheduled
//! recompute; they never propagate to the submission caller.
//!
//! [`Validation`]: LeaderboardError::Validation
//! [`NotFound`]: LeaderboardError::NotFound
//! [`Storage`]: LeaderboardError::Storage
//! [`Arithmetic`]: LeaderboardError::Arithmetic

use arena_types::PlayerId;

/// Errors that can occur in the leaderboard engine.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    /// Malformed input, rejected before any side effect.
    #[error("validation error: {reason}")]
    Validation {
        /// What was wrong with the input.
        reason: String,
    },

    /// The referenced player does not exist, rejected before any side effect.
    #[error("player {player_id} not found")]
    NotFound {
        /// The unknown player id.
        player_id: PlayerId,
    },

    /// A transient storage failure during the atomic unit.
    ///
    /// The unit rolls back in full; the caller may safely retry the
    /// whole submission.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the underlying failure.
        message: String,
    },

    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow: {context}")]
    Arithmetic {
        /// Where the overflow happened.
        context: String,
    },
}
