//! Durable layer for the Arena leaderboard (`PostgreSQL` + Redis).
//!
//! `PostgreSQL` holds the durable state: player identities, the
//! append-only score-event log, and the aggregate table with its rank
//! column. Redis holds the shared, time-bounded top-N read cache for
//! multi-replica deployments.
//!
//! # Architecture
//!
//! ```text
//! Submission (durable path)
//!     |
//!     +-- one transaction ---> PostgreSQL (PostgresPool)
//!         |-- ScoreEventStore  (append-only score events)
//!         |-- StandingStore    (mean aggregate + rank SQL)
//!         +-- PlayerStore      (identity, batch population)
//!
//! Top-N reads ---> RedisCache (TTL) or StandingStore on miss
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool and schema setup
//! - [`players`] -- player table, batched million-scale creation
//! - [`events`] -- score-event appends and UNNEST batch inserts
//! - [`standings`] -- aggregate upserts and rank SQL
//! - [`redis_cache`] -- shared top-N cache with server-side expiry
//! - [`error`] -- shared error types

pub mod error;
pub mod events;
pub mod players;
pub mod postgres;
pub mod redis_cache;
pub mod standings;

// Re-export primary types for convenience.
pub use error::DbError;
pub use events::{ScoreEventRow, ScoreEventStore};
pub use players::PlayerStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use redis_cache::RedisCache;
pub use standings::{DurableSubmit, StandingRow, StandingStore};
