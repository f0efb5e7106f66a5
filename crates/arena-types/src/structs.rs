//! Core entity structs for the Arena leaderboard.
//!
//! Three records back the ranking pipeline:
//!
//! - [`ScoreEvent`] -- an immutable submission fact in the append-only log
//! - [`AggregateEntry`] -- the derived per-player summary row
//! - [`Player`] -- the identity record, owned by the identity subsystem
//!
//! The remaining structs are read-model projections served to clients.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GameMode;
use crate::ids::{EventId, PlayerId};

/// A player identity record.
///
/// Created once by the identity subsystem and immutable thereafter.
/// The leaderboard core only ever holds the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Stable numeric identifier.
    pub id: PlayerId,
    /// Unique display name.
    pub username: String,
    /// When the player joined.
    pub join_date: DateTime<Utc>,
}

/// An immutable score submission fact.
///
/// Appended to the event log by the update coordinator; never mutated
/// or deleted in normal operation. The full per-player event history is
/// what the aggregate rescan recomputes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScoreEvent {
    /// Sequential event identifier.
    pub id: EventId,
    /// The submitting player.
    pub player_id: PlayerId,
    /// Raw score, domain-validated non-negative.
    pub score: u32,
    /// Game mode the score was earned in.
    pub mode: GameMode,
    /// When the score was earned.
    pub timestamp: DateTime<Utc>,
}

/// One mutable summary row per player with at least one score event.
///
/// `total_score` is the all-time mean of the player's scores and is a
/// pure function of that player's event set: the incremental fold and
/// a full rescan of the log must agree. `rank` stays `None` until the
/// player is first ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AggregateEntry {
    /// The player this row summarizes.
    pub player_id: PlayerId,
    /// Mean of all-time scores.
    #[ts(type = "string")]
    pub total_score: Decimal,
    /// Number of score events folded into the mean.
    pub submissions: u64,
    /// Competition rank, `None` until first ranked.
    pub rank: Option<u32>,
}

/// A row in the top-N standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// The ranked player.
    pub player_id: PlayerId,
    /// The player's display name.
    pub username: String,
    /// Mean of all-time scores.
    #[ts(type = "string")]
    pub total_score: Decimal,
    /// Competition rank (0 if not yet ranked).
    pub rank: u32,
}

/// A single player's standing, served by the rank lookup endpoint.
///
/// A player who exists but has never submitted a score gets the
/// defined "unranked" result: rank 0, zero score, zero submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerStanding {
    /// The player being looked up.
    pub player_id: PlayerId,
    /// The player's display name.
    pub username: String,
    /// Competition rank (0 if unranked).
    pub rank: u32,
    /// Mean of all-time scores (zero if unranked).
    #[ts(type = "string")]
    pub total_score: Decimal,
    /// Total number of submissions.
    pub total_submissions: u64,
}

/// Receipt returned to the caller of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubmitOutcome {
    /// The submitting player.
    pub player_id: PlayerId,
    /// Updated total submission count.
    pub total_submissions: u64,
    /// Updated mean score after the fold.
    #[ts(type = "string")]
    pub total_score: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_entry_roundtrip_serde() {
        let entry = AggregateEntry {
            player_id: PlayerId::new(1),
            total_score: Decimal::new(755, 1),
            submissions: 2,
            rank: Some(3),
        };
        let json = serde_json::to_string(&entry).ok();
        assert!(json.is_some());
        let restored: Result<AggregateEntry, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(entry));
    }

    #[test]
    fn unranked_entry_serializes_null_rank() {
        let entry = AggregateEntry {
            player_id: PlayerId::new(9),
            total_score: Decimal::ZERO,
            submissions: 0,
            rank: None,
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();
        assert!(json.contains("\"rank\":null"));
    }
}
