//! Shared type definitions for the Arena leaderboard.
//!
//! This crate is the single source of truth for the types used across
//! the Arena workspace. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the leaderboard dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for entity identifiers
//! - [`enums`] -- Enumeration types (game modes)
//! - [`structs`] -- Core entity structs (players, score events, aggregates)

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::GameMode;
pub use ids::{EventId, PlayerId};
pub use structs::{
    AggregateEntry, LeaderboardEntry, Player, PlayerStanding, ScoreEvent, SubmitOutcome,
};
