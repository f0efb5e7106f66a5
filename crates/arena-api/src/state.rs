//! Shared application state for the leaderboard API server.

use std::sync::Arc;

use arena_core::Leaderboard;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// engine owns the event log, aggregate table, rank index, and read
/// cache; every handler goes through its facade.
pub struct AppState {
    /// The leaderboard engine.
    pub engine: Leaderboard,
}

impl AppState {
    /// Wrap an engine for injection into the router.
    pub const fn new(engine: Leaderboard) -> Self {
        Self { engine }
    }

    /// Convenience constructor returning the state pre-wrapped.
    pub fn shared(engine: Leaderboard) -> Arc<Self> {
        Arc::new(Self::new(engine))
    }
}
