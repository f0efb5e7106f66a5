//! Score-event table operations.
//!
//! The `score_events` table is the durable append-only log: every
//! accepted submission lands here exactly once, and the aggregate
//! table can always be rebuilt from it. Single appends run inside the
//! submission transaction; the batch path exists for synthetic
//! population at tens-of-millions scale.

use arena_types::{EventId, GameMode, PlayerId, ScoreEvent};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbError;

/// Default batch size for event inserts.
const DEFAULT_BATCH_SIZE: usize = 10_000;

/// A row from the `score_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreEventRow {
    /// Auto-incremented event id.
    pub id: i64,
    /// The submitting player.
    pub player_id: i64,
    /// Raw score.
    pub score: i32,
    /// Game mode as stored (`SOLO` / `TEAM`).
    pub game_mode: String,
    /// When the score was earned.
    pub ts: DateTime<Utc>,
}

/// Operations on the `score_events` table.
pub struct ScoreEventStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> ScoreEventStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for inserts.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Append a single event and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails (including a
    /// foreign-key violation for an unknown player).
    pub async fn append(
        &self,
        player_id: PlayerId,
        score: u32,
        mode: GameMode,
        timestamp: DateTime<Utc>,
    ) -> Result<EventId, DbError> {
        let (id,): (i64,) = sqlx::query_as(
            r"INSERT INTO score_events (player_id, score, game_mode, ts)
              VALUES ($1, $2, $3, $4)
              RETURNING id",
        )
        .bind(player_id.into_inner())
        .bind(i64::from(score))
        .bind(mode.as_db_str())
        .bind(timestamp)
        .fetch_one(self.pool)
        .await?;
        Ok(EventId::new(id))
    }

    /// Batch-insert events using multi-row UNNEST inserts.
    ///
    /// Each batch is wrapped in a transaction so either all events in
    /// the batch are committed or none are.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if an insert fails.
    pub async fn batch_insert(&self, events: &[ScoreEvent]) -> Result<(), DbError> {
        if events.is_empty() {
            return Ok(());
        }

        for chunk in events.chunks(self.batch_size) {
            let len = chunk.len();
            let mut player_ids = Vec::with_capacity(len);
            let mut scores: Vec<i64> = Vec::with_capacity(len);
            let mut modes = Vec::with_capacity(len);
            let mut timestamps = Vec::with_capacity(len);

            for event in chunk {
                player_ids.push(event.player_id.into_inner());
                scores.push(i64::from(event.score));
                modes.push(event.mode.as_db_str().to_owned());
                timestamps.push(event.timestamp);
            }

            let mut tx = self.pool.begin().await?;
            sqlx::query(
                r"INSERT INTO score_events (player_id, score, game_mode, ts)
                  SELECT * FROM UNNEST($1::BIGINT[], $2::BIGINT[], $3::TEXT[], $4::TIMESTAMPTZ[])",
            )
            .bind(&player_ids)
            .bind(&scores)
            .bind(&modes)
            .bind(&timestamps)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
        }

        tracing::debug!(count = events.len(), "inserted score events (batch UNNEST)");
        Ok(())
    }

    /// All events for one player, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn events_for(&self, player_id: PlayerId) -> Result<Vec<ScoreEventRow>, DbError> {
        let rows = sqlx::query_as::<_, ScoreEventRow>(
            r"SELECT id, player_id, score, game_mode, ts
              FROM score_events
              WHERE player_id = $1
              ORDER BY id",
        )
        .bind(player_id.into_inner())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Total number of events in the log.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn len(&self) -> Result<u64, DbError> {
        let (count,): (i64,) = sqlx::query_as(r"SELECT COUNT(*) FROM score_events")
            .fetch_one(self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
