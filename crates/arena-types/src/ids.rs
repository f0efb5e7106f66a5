//! Type-safe identifier wrappers around `i64`.
//!
//! Player and event identifiers are sequential integers assigned by the
//! storage layer (`BIGSERIAL` in `PostgreSQL`, an atomic counter in the
//! in-memory engine). Wrapping them in newtypes prevents accidental
//! mixing of identifiers at compile time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `i64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw integer identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player.
    ///
    /// Players are owned by the identity subsystem; the leaderboard core
    /// holds them by reference through this id only.
    PlayerId
}

define_id! {
    /// Unique identifier for a score event in the append-only log.
    EventId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let player = PlayerId::new(7);
        let event = EventId::new(7);
        // Same raw value, different types -- the compiler enforces no mixing.
        assert_eq!(player.into_inner(), event.into_inner());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = PlayerId::new(42);
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("42"));
        let restored: Result<PlayerId, _> = serde_json::from_str("42");
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_raw() {
        let id = PlayerId::new(123);
        assert_eq!(id.to_string(), "123");
    }
}
