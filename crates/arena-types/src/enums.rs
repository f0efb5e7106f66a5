//! Enumeration types shared across the Arena workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The game mode a score was earned in.
///
/// Serialized in lowercase on the wire (`"solo"` / `"team"`, matching
/// the submission schema); the database layer stores the upper-case
/// forms via [`GameMode::as_db_str`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum GameMode {
    /// A single-player session.
    #[default]
    Solo,
    /// A team session.
    Team,
}

impl GameMode {
    /// The upper-case form stored in the `game_mode` database column.
    pub const fn as_db_str(self) -> &'static str {
        match self {
            Self::Solo => "SOLO",
            Self::Team => "TEAM",
        }
    }

    /// Parse a mode string, accepting any casing.
    ///
    /// Returns `None` for unrecognized modes; the caller decides whether
    /// that is a validation failure.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "solo" => Some(Self::Solo),
            "team" => Some(Self::Team),
            _ => None,
        }
    }
}

impl core::fmt::Display for GameMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Solo => write!(f, "solo"),
            Self::Team => write!(f, "team"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_any_casing() {
        assert_eq!(GameMode::parse("solo"), Some(GameMode::Solo));
        assert_eq!(GameMode::parse("SOLO"), Some(GameMode::Solo));
        assert_eq!(GameMode::parse("Team"), Some(GameMode::Team));
        assert_eq!(GameMode::parse("ranked"), None);
    }

    #[test]
    fn db_str_is_upper_case() {
        assert_eq!(GameMode::Solo.as_db_str(), "SOLO");
        assert_eq!(GameMode::Team.as_db_str(), "TEAM");
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&GameMode::Team).ok();
        assert_eq!(json.as_deref(), Some("\"team\""));
    }
}
