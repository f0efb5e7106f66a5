//! Configuration loading and typed config structures for the Arena
//! leaderboard.
//!
//! The canonical configuration lives in `arena-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure, and provides a loader that reads and validates
//! the file. Infrastructure URLs can be overridden by environment
//! variables so deployments never need to edit the file.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// When the single-player rank update runs relative to the submission.
///
/// `Synchronous` updates the rank inline before the submission returns:
/// a client reading its own rank immediately after submitting sees the
/// new value. `Deferred` hands the update to a background task; the
/// submission returns sooner but a reader may briefly observe a stale
/// rank (eventual consistency, bounded by the next full recompute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPolicy {
    /// Update the rank inline before returning success.
    #[default]
    Synchronous,
    /// Update the rank on a background task after commit.
    Deferred,
}

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Single-player rank update policy after each submission.
    pub rank_policy: RankPolicy,

    /// Time-to-live for cached top-N results, in milliseconds.
    ///
    /// The cache has no write invalidation; this TTL alone bounds how
    /// stale a top-N read can be.
    pub cache_ttl_ms: u64,

    /// Run a full rank recompute after this many submissions.
    ///
    /// Corrects any drift introduced by the incremental rank path.
    /// Zero disables the submission-count trigger (the maintenance
    /// endpoint can still be called explicitly).
    pub full_refresh_every: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rank_policy: RankPolicy::Synchronous,
            cache_ttl_ms: 60_000,
            full_refresh_every: 10_000,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// The host address to bind to.
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

/// Player seeding performed at server startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Number of players to register in the in-memory directory.
    pub players: u64,
}

/// Infrastructure connection strings (durable layer, optional).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` connection URL for the durable layer.
    pub postgres_url: Option<String>,
    /// Redis connection URL for the shared read cache.
    pub redis_url: Option<String>,
}

impl InfrastructureConfig {
    /// Apply environment variable overrides for infrastructure URLs.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.postgres_url = Some(url);
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.redis_url = Some(url);
        }
    }
}

/// Top-level Arena configuration.
///
/// Mirrors the structure of `arena-config.yaml`. All fields have
/// defaults, so an empty file (or no file at all) yields a working
/// development configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Engine tuning knobs.
    pub engine: EngineConfig,
    /// HTTP server settings.
    pub http: HttpConfig,
    /// Startup player seeding.
    pub seed: SeedConfig,
    /// Infrastructure connection strings.
    pub infrastructure: InfrastructureConfig,
}

impl ArenaConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for infrastructure
    /// URLs: `DATABASE_URL` overrides `infrastructure.postgres_url`,
    /// `REDIS_URL` overrides `infrastructure.redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = ArenaConfig::parse("{}").ok();
        assert_eq!(config, Some(ArenaConfig::default()));
    }

    #[test]
    fn engine_knobs_parse() {
        let yaml = r"
engine:
  rank_policy: deferred
  cache_ttl_ms: 5000
  full_refresh_every: 100
";
        let config = ArenaConfig::parse(yaml).unwrap_or_default();
        assert_eq!(config.engine.rank_policy, RankPolicy::Deferred);
        assert_eq!(config.engine.cache_ttl_ms, 5000);
        assert_eq!(config.engine.full_refresh_every, 100);
    }

    #[test]
    fn infrastructure_urls_parse() {
        let yaml = r#"
infrastructure:
  postgres_url: "postgresql://arena:arena@db:5432/arena"
  redis_url: "redis://cache:6379"
"#;
        let config = ArenaConfig::parse(yaml).unwrap_or_default();
        assert_eq!(
            config.infrastructure.postgres_url.as_deref(),
            Some("postgresql://arena:arena@db:5432/arena")
        );
        assert_eq!(
            config.infrastructure.redis_url.as_deref(),
            Some("redis://cache:6379")
        );
    }

    #[test]
    fn default_rank_policy_is_synchronous() {
        assert_eq!(EngineConfig::default().rank_policy, RankPolicy::Synchronous);
    }
}
