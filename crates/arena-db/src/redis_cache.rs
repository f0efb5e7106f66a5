//! Redis-backed read cache for top-N standings.
//!
//! When multiple API replicas share one leaderboard database, the
//! process-local TTL cache is not enough: each replica would refill
//! independently. This cache stores the serialized top-N payload in
//! Redis under `leaderboard:top:{n}` with a server-side expiry, so the
//! staleness bound is shared across replicas. Semantics match the
//! in-process cache: TTL only, no write invalidation.

use std::time::Duration;

use arena_types::LeaderboardEntry;
use fred::prelude::*;

use crate::error::DbError;

/// Connection handle to a Redis-compatible instance.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    ttl: Duration,
}

impl RedisCache {
    /// Connect to Redis at the given URL with the given entry TTL.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Redis`] if the connection fails.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("invalid Redis URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Redis");
        Ok(Self { client, ttl })
    }

    /// The cache key for a top-N result.
    fn key(n: usize) -> String {
        format!("leaderboard:top:{n}")
    }

    /// The cached top-N rows, if present and not expired.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the payload cannot be
    /// decoded. Returns [`DbError::Redis`] if the read fails.
    pub async fn get_top(&self, n: usize) -> Result<Option<Vec<LeaderboardEntry>>, DbError> {
        let value: Option<String> = self.client.get(Self::key(n)).await?;
        value
            .map(|json| serde_json::from_str(&json).map_err(DbError::Serialization))
            .transpose()
    }

    /// Store a fresh top-N result with the configured expiry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if encoding fails.
    /// Returns [`DbError::Redis`] if the write fails.
    pub async fn set_top(&self, n: usize, rows: &[LeaderboardEntry]) -> Result<(), DbError> {
        let json = serde_json::to_string(rows)?;
        let expire_secs = i64::try_from(self.ttl.as_secs().max(1)).unwrap_or(i64::MAX);
        let _: () = self
            .client
            .set(
                Self::key(n),
                json.as_str(),
                Some(Expiration::EX(expire_secs)),
                None,
                false,
            )
            .await?;
        Ok(())
    }

    /// Drop the cached result for `n`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Redis`] if the delete fails.
    pub async fn invalidate(&self, n: usize) -> Result<(), DbError> {
        let _: u32 = self.client.del(Self::key(n)).await?;
        Ok(())
    }
}
