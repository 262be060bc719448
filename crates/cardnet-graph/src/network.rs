//! Thread-safe entry point to the friend graph.
//!
//! `FriendNetwork` is what request handlers hold. Reads share a guard and
//! run side by side. Every write takes the exclusive guard for the whole
//! operation, so both halves of a friendship appear or disappear together
//! from the point of view of any reader.
//!
//! With a [`SnapshotSink`] attached, a write is applied to a copy of the
//! graph, the copy is saved, and only then does it replace the live graph.
//! A failed save leaves nothing behind. Writers queue on the upgradable
//! guard, so snapshots reach the sink in commit order while readers keep
//! the previous graph until the swap.

use crate::error::{GraphError, Result};
use crate::graph::{GraphStats, SocialGraph};
use crate::query::{Connection, Recommendation};
use crate::store::SnapshotSink;
use cardnet_core::{Person, PersonUpdate};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared, lock-protected social graph.
#[derive(Default)]
pub struct FriendNetwork {
    graph: RwLock<SocialGraph>,
    sink: Option<Arc<dyn SnapshotSink>>,
}

impl fmt::Debug for FriendNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FriendNetwork")
            .field("graph", &self.graph)
            .field("persistent", &self.is_persistent())
            .finish()
    }
}

impl FriendNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a graph whose every change must be saved to `sink` first.
    pub fn with_sink(graph: SocialGraph, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            graph: RwLock::new(graph),
            sink: Some(sink),
        }
    }

    /// True if writes go through a snapshot sink.
    pub fn is_persistent(&self) -> bool {
        self.sink.is_some()
    }

    /// Runs `f` against a consistent view of the graph.
    pub fn read<R>(&self, f: impl FnOnce(&SocialGraph) -> R) -> R {
        let guard = self.graph.read();
        f(&*guard)
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut SocialGraph) -> Result<T>) -> Result<T> {
        let Some(sink) = &self.sink else {
            return op(&mut *self.graph.write());
        };

        let current = self.graph.upgradable_read();
        let mut next = (*current).clone();
        let out = op(&mut next)?;
        sink.save(&next)?;
        *RwLockUpgradableReadGuard::upgrade(current) = next;
        Ok(out)
    }

    /// Looks up a person by user id.
    pub fn get_person(&self, user_id: &str) -> Result<Person> {
        let graph = self.graph.read();
        let index = graph.require_index(user_id)?;
        graph
            .get(index)
            .cloned()
            .ok_or_else(|| GraphError::NotFound(user_id.to_string()))
    }

    /// Registers a new person and returns the stored record.
    pub fn create_person(&self, person: Person) -> Result<Person> {
        let stored = self.mutate(|graph| {
            let index = graph.add_person(person)?;
            graph
                .get(index)
                .cloned()
                .ok_or_else(|| GraphError::Internal("inserted person vanished".into()))
        })?;
        info!("Registered {} ({})", stored.user_id, stored.internal_id);
        Ok(stored)
    }

    /// Applies an attribute update from the profile service.
    pub fn update_person(&self, user_id: &str, update: PersonUpdate) -> Result<Person> {
        let person = self.mutate(|graph| graph.update_person(user_id, update).cloned())?;
        debug!("Updated attributes of {}", user_id);
        Ok(person)
    }

    /// Makes two people friends. Already being friends is not an error.
    pub fn create_friendship(&self, user_a: &str, user_b: &str) -> Result<()> {
        if self.mutate(|graph| graph.create_friendship(user_a, user_b))? {
            info!("{} and {} are now friends", user_a, user_b);
        }
        Ok(())
    }

    /// Ends a friendship. Unknown users and absent pairs are a no-op.
    pub fn delete_friendship(&self, user_a: &str, user_b: &str) -> Result<()> {
        if self.mutate(|graph| graph.delete_friendship(user_a, user_b))? {
            info!("{} and {} are no longer friends", user_a, user_b);
        }
        Ok(())
    }

    /// True if both users exist and are friends.
    pub fn are_friends(&self, user_a: &str, user_b: &str) -> bool {
        self.graph.read().are_friends(user_a, user_b)
    }

    /// Direct friends of a user, ordered by user id.
    pub fn list_direct_friends(&self, user_id: &str) -> Result<Vec<Person>> {
        self.graph.read().list_direct_friends(user_id)
    }

    /// Up to 20 people within two hops, best connected first.
    pub fn recommend_friends(&self, user_id: &str) -> Vec<Recommendation> {
        self.graph.read().recommend_friends(user_id)
    }

    /// Everyone within three hops with their hop distance.
    pub fn network_connections(&self, user_id: &str) -> Vec<Connection> {
        self.graph.read().network_connections(user_id)
    }

    /// Friends two users have in common.
    pub fn mutual_friends(&self, user_a: &str, user_b: &str) -> Result<Vec<Person>> {
        self.graph.read().mutual_friends(user_a, user_b)
    }

    /// Person and friendship counts.
    pub fn stats(&self) -> GraphStats {
        self.graph.read().stats()
    }

    /// Fails with `Internal` if any FRIEND_OF edge lacks its reverse.
    pub fn verify_symmetry(&self) -> Result<()> {
        self.graph.read().verify_symmetry()
    }
}
