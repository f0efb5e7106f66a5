//! Player directory seam and in-memory implementation.
//!
//! Player identity is owned by an external subsystem; the leaderboard
//! core only ever needs two questions answered: does this player exist,
//! and what is their display name. The [`PlayerDirectory`] trait is
//! that seam. [`InMemoryDirectory`] is the implementation used by the
//! server seed path, the load generator, and tests.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use arena_types::{Player, PlayerId};
use chrono::Utc;

/// Lookup interface to the identity subsystem.
///
/// Implementations must be cheap to call: the coordinator consults
/// [`exists`](PlayerDirectory::exists) on every submission before any
/// side effect is taken.
pub trait PlayerDirectory: Send + Sync {
    /// Whether a player with this id exists.
    fn exists(&self, id: PlayerId) -> bool;

    /// The player's display name, if the player exists.
    fn username(&self, id: PlayerId) -> Option<String>;
}

/// Interior state of the in-memory directory.
#[derive(Debug, Default)]
struct DirectoryState {
    players: BTreeMap<PlayerId, Player>,
    next_id: i64,
}

/// In-memory player directory.
///
/// Ids are assigned sequentially starting at 1, matching the
/// auto-increment behavior of the production identity store.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single player and return the new record.
    pub fn register(&self, username: &str) -> Player {
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        state.next_id = state.next_id.checked_add(1).unwrap_or(i64::MAX);
        let player = Player {
            id: PlayerId::new(state.next_id),
            username: username.to_owned(),
            join_date: Utc::now(),
        };
        state.players.insert(player.id, player.clone());
        player
    }

    /// Register `count` players with generated `player_{n}` usernames.
    ///
    /// Returns the assigned ids. Used for startup seeding and synthetic
    /// population; continues numbering after any existing players so
    /// usernames stay unique. The whole batch runs under one write
    /// lock, so concurrent batches can never mint the same username.
    pub fn register_batch(&self, count: u64) -> Vec<PlayerId> {
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        let mut ids = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for _ in 0..count {
            state.next_id = state.next_id.checked_add(1).unwrap_or(i64::MAX);
            let id = PlayerId::new(state.next_id);
            let player = Player {
                id,
                username: format!("player_{}", state.next_id),
                join_date: now,
            };
            state.players.insert(id, player);
            ids.push(id);
        }
        ids
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .players
            .len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlayerDirectory for InMemoryDirectory {
    fn exists(&self, id: PlayerId) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .players
            .contains_key(&id)
    }

    fn username(&self, id: PlayerId) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .players
            .get(&id)
            .map(|p| p.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn register_assigns_sequential_ids() {
        let directory = InMemoryDirectory::new();
        let a = directory.register("alice");
        let b = directory.register("bob");
        assert_eq!(a.id, PlayerId::new(1));
        assert_eq!(b.id, PlayerId::new(2));
    }

    #[test]
    fn exists_and_username() {
        let directory = InMemoryDirectory::new();
        let alice = directory.register("alice");
        assert!(directory.exists(alice.id));
        assert_eq!(directory.username(alice.id), Some(String::from("alice")));
        assert!(!directory.exists(PlayerId::new(999_999)));
        assert_eq!(directory.username(PlayerId::new(999_999)), None);
    }

    #[test]
    fn concurrent_batches_mint_unique_usernames() {
        let directory = Arc::new(InMemoryDirectory::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let d = Arc::clone(&directory);
            handles.push(std::thread::spawn(move || d.register_batch(50)));
        }
        let mut all_ids = Vec::new();
        for handle in handles {
            all_ids.extend(handle.join().unwrap_or_default());
        }

        assert_eq!(all_ids.len(), 200);
        assert_eq!(directory.len(), 200);
        let usernames: BTreeSet<String> = all_ids
            .iter()
            .filter_map(|id| directory.username(*id))
            .collect();
        assert_eq!(usernames.len(), 200, "duplicate username minted");
    }

    #[test]
    fn batch_registration_numbers_after_existing() {
        let directory = InMemoryDirectory::new();
        directory.register("alice");
        let ids = directory.register_batch(3);
        assert_eq!(ids.len(), 3);
        assert_eq!(directory.len(), 4);
        assert_eq!(
            directory.username(PlayerId::new(2)),
            Some(String::from("player_2"))
        );
    }
}
