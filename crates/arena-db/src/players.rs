//! Player table operations, including million-scale batch creation.
//!
//! Synthetic population is a batched-append client of this store:
//! instead of N individual INSERT statements, each batch uses a single
//! INSERT over UNNEST arrays, reducing round-trips to `PostgreSQL` by a
//! factor of the batch size.

use arena_types::PlayerId;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbError;

/// Default batch size for player inserts.
const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Operations on the `players` table.
pub struct PlayerStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> PlayerStore<'a> {
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

    /// Insert a single player and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails (including a
    /// username uniqueness violation).
    pub async fn create(&self, username: &str) -> Result<PlayerId, DbError> {
        let (id,): (i64,) = sqlx::query_as(
            r"INSERT INTO players (username, join_date) VALUES ($1, now()) RETURNING id",
        )
        .bind(username)
        .fetch_one(self.pool)
        .await?;
        Ok(PlayerId::new(id))
    }

    /// Batch-insert players with generated `player_{n}` usernames.
    ///
    /// Numbering continues after the current maximum id so usernames
    /// stay unique across repeated runs. Each batch commits in its own
    /// transaction; progress is logged per batch so a million-row run
    /// is observable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if an insert fails. Previously
    /// committed batches are not rolled back.
    pub async fn create_batch(&self, count: u64) -> Result<Vec<PlayerId>, DbError> {
        let (start,): (i64,) =
            sqlx::query_as(r"SELECT COALESCE(MAX(id), 0) FROM players")
                .fetch_one(self.pool)
                .await?;

        let now = Utc::now();
        let mut ids = Vec::new();
        let mut created: u64 = 0;

        while created < count {
            let remaining = count.saturating_sub(created);
            let batch = usize::try_from(remaining)
                .unwrap_or(usize::MAX)
                .min(self.batch_size);

            let mut usernames = Vec::with_capacity(batch);
            let mut join_dates: Vec<DateTime<Utc>> = Vec::with_capacity(batch);
            for offset in 0..batch {
                let n = start
                    .saturating_add(i64::try_from(created).unwrap_or(i64::MAX))
                    .saturating_add(i64::try_from(offset).unwrap_or(i64::MAX))
                    .saturating_add(1);
                usernames.push(format!("player_{n}"));
                join_dates.push(now);
            }

            let mut tx = self.pool.begin().await?;
            let rows: Vec<(i64,)> = sqlx::query_as(
                r"INSERT INTO players (username, join_date)
                  SELECT * FROM UNNEST($1::VARCHAR[], $2::TIMESTAMPTZ[])
                  RETURNING id",
            )
            .bind(&usernames)
            .bind(&join_dates)
            .fetch_all(&mut *tx)
            .await?;
            tx.commit().await?;

            ids.extend(rows.into_iter().map(|(id,)| PlayerId::new(id)));
            created = created.saturating_add(u64::try_from(batch).unwrap_or(u64::MAX));
            tracing::info!(created, total = count, "player batch committed");
        }

        Ok(ids)
    }

    /// Whether a player with this id exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn exists(&self, id: PlayerId) -> Result<bool, DbError> {
        let (found,): (bool,) =
            sqlx::query_as(r"SELECT EXISTS(SELECT 1 FROM players WHERE id = $1)")
                .bind(id.into_inner())
                .fetch_one(self.pool)
                .await?;
        Ok(found)
    }

    /// The player's display name, if the player exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn username(&self, id: PlayerId) -> Result<Option<String>, DbError> {
        let row: Option<(String,)> =
            sqlx::query_as(r"SELECT username FROM players WHERE id = $1")
                .bind(id.into_inner())
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(|(username,)| username))
    }
}
