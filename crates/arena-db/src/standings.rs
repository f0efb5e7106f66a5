//! Aggregate table and rank SQL.
//!
//! The `leaderboard` table carries one row per player with a mean
//! `total_score`, a submission count, and a nullable `rank` column.
//! [`submit_score`](StandingStore::submit_score) is the durable
//! submission path: event append, aggregate recompute, and the
//! single-player rank update execute in one transaction, so either all
//! of it commits or none of it is observable.
//!
//! [`recompute_all_ranks`](StandingStore::recompute_all_ranks) is the
//! maintenance job: a single `RANK() OVER` statement reassigns every
//! rank with the ties-share/next-skips rule, atomically with respect
//! to readers.

use arena_types::PlayerId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DbError;

/// A row from the `leaderboard` table joined with `players`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StandingRow {
    /// The ranked player.
    pub player_id: i64,
    /// The player's display name.
    pub username: String,
    /// Mean of all-time scores.
    pub total_score: Decimal,
    /// Competition rank; `NULL` until first ranked.
    pub rank: Option<i64>,
}

/// Receipt from the durable submission path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurableSubmit {
    /// Assigned score-event id.
    pub event_id: i64,
    /// Updated submission count.
    pub total_submissions: i64,
    /// Updated mean score.
    pub total_score: Decimal,
}

/// Operations on the `leaderboard` aggregate table.
pub struct StandingStore<'a> {
    pool: &'a PgPool,
}

impl<'a> StandingStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Durable submission: append the event, recompute the player's
    /// mean aggregate, and update their rank, in one transaction.
    ///
    /// The aggregate is recomputed with `AVG(score)` over the player's
    /// full history inside the same transaction that appended the
    /// event, so the log and the aggregate can never disagree.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] on any failure; the transaction
    /// rolls back in full and the caller may retry the submission.
    pub async fn submit_score(
        &self,
        player_id: PlayerId,
        score: u32,
        game_mode: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<DurableSubmit, DbError> {
        let mut tx = self.pool.begin().await?;

        let (event_id,): (i64,) = sqlx::query_as(
            r"INSERT INTO score_events (player_id, score, game_mode, ts)
              VALUES ($1, $2, $3, $4)
              RETURNING id",
        )
        .bind(player_id.into_inner())
        .bind(i64::from(score))
        .bind(game_mode)
        .bind(timestamp)
        .fetch_one(&mut *tx)
        .await?;

        let (total_score, total_submissions): (Decimal, i64) = sqlx::query_as(
            r"INSERT INTO leaderboard (player_id, total_score, submissions)
              SELECT player_id, AVG(score)::NUMERIC, COUNT(*)
              FROM score_events
              WHERE player_id = $1
              GROUP BY player_id
              ON CONFLICT (player_id) DO UPDATE
                  SET total_score = EXCLUDED.total_score,
                      submissions = EXCLUDED.submissions
              RETURNING total_score, submissions",
        )
        .bind(player_id.into_inner())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"UPDATE leaderboard
              SET rank = (
                  SELECT COUNT(*) + 1
                  FROM leaderboard AS l2
                  WHERE l2.total_score > leaderboard.total_score
              )
              WHERE player_id = $1",
        )
        .bind(player_id.into_inner())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DurableSubmit {
            event_id,
            total_submissions,
            total_score,
        })
    }

    /// Rebuild every aggregate row from the score-event log.
    ///
    /// One `INSERT .. SELECT AVG .. GROUP BY` pass over `score_events`
    /// upserts the whole `leaderboard` table. Used after bulk event
    /// loads, where per-submission upserts would be wasteful, and as
    /// the durable-layer consistency backstop. Returns the number of
    /// aggregate rows written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn rebuild_aggregates(&self) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"INSERT INTO leaderboard (player_id, total_score, submissions)
              SELECT player_id, AVG(score)::NUMERIC, COUNT(*)
              FROM score_events
              GROUP BY player_id
              ON CONFLICT (player_id) DO UPDATE
                  SET total_score = EXCLUDED.total_score,
                      submissions = EXCLUDED.submissions",
        )
        .execute(self.pool)
        .await?;
        tracing::info!(rows = result.rows_affected(), "aggregate rebuild (SQL)");
        Ok(result.rows_affected())
    }

    /// Reassign every rank with a single `RANK() OVER` update.
    ///
    /// Idempotent; intended for the periodic maintenance job or the
    /// administrative endpoint. Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn recompute_all_ranks(&self) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"UPDATE leaderboard
              SET rank = ranked.new_rank
              FROM (
                  SELECT player_id,
                         RANK() OVER (ORDER BY total_score DESC) AS new_rank
                  FROM leaderboard
              ) ranked
              WHERE leaderboard.player_id = ranked.player_id",
        )
        .execute(self.pool)
        .await?;
        tracing::info!(rows = result.rows_affected(), "full rank recompute (SQL)");
        Ok(result.rows_affected())
    }

    /// The top `n` standings, ordered by `total_score` descending.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn top(&self, n: i64) -> Result<Vec<StandingRow>, DbError> {
        let rows = sqlx::query_as::<_, StandingRow>(
            r"SELECT l.player_id, p.username, l.total_score, l.rank
              FROM leaderboard l
              JOIN players p ON p.id = l.player_id
              ORDER BY l.total_score DESC, l.player_id ASC
              LIMIT $1",
        )
        .bind(n)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// One player's standing, if they have an aggregate row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn standing(&self, player_id: PlayerId) -> Result<Option<StandingRow>, DbError> {
        let row = sqlx::query_as::<_, StandingRow>(
            r"SELECT l.player_id, p.username, l.total_score, l.rank
              FROM leaderboard l
              JOIN players p ON p.id = l.player_id
              WHERE l.player_id = $1",
        )
        .bind(player_id.into_inner())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }
}
