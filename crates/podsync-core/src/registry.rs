//! Room membership bookkeeping.
//!
//! [`RoomRegistry`] maps connections to the rooms they joined and back.
//! It is a plain owned value: the server constructs one at start-up,
//! wraps it in its own lock, and drops it at shutdown. Nothing here is
//! process-global, so tests can run any number of registries side by side.
//!
//! Rooms only exist while they have members. Removing the last member
//! removes the room entry as well.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::resource::RoomId;

/// Identifier for a live connection.
///
/// Opaque; the server only guarantees uniqueness over the lifetime of
/// the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-way index between connections and rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room -> members. Never holds an empty set.
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,

    /// Connection -> joined rooms. Never holds an empty set.
    memberships: HashMap<ConnectionId, HashSet<RoomId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        RoomRegistry::default()
    }

    /// Add `connection` to `room`.
    ///
    /// Idempotent. Returns `true` when the membership is new.
    pub fn join(&mut self, connection: ConnectionId, room: RoomId) -> bool {
        let added = self
            .rooms
            .entry(room.clone())
            .or_default()
            .insert(connection);
        if added {
            self.memberships.entry(connection).or_default().insert(room);
        }
        added
    }

    /// Remove `connection` from `room`.
    ///
    /// Idempotent. Returns `true` when a membership was removed.
    pub fn leave(&mut self, connection: ConnectionId, room: &RoomId) -> bool {
        let removed = match self.rooms.get_mut(room) {
            Some(members) => {
                let removed = members.remove(&connection);
                if members.is_empty() {
                    self.rooms.remove(room);
                }
                removed
            }
            None => false,
        };

        if removed {
            if let Some(joined) = self.memberships.get_mut(&connection) {
                joined.remove(room);
                if joined.is_empty() {
                    self.memberships.remove(&connection);
                }
            }
        }

        removed
    }

    /// Remove `connection` from every room it joined.
    ///
    /// Returns the rooms it was removed from, sorted.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<RoomId> {
        let joined = match self.memberships.remove(&connection) {
            Some(joined) => joined,
            None => return Vec::new(),
        };

        for room in &joined {
            if let Some(members) = self.rooms.get_mut(room) {
                members.remove(&connection);
                if members.is_empty() {
                    self.rooms.remove(room);
                }
            }
        }

        let sorted: BTreeSet<RoomId> = joined.into_iter().collect();
        sorted.into_iter().collect()
    }

    /// Snapshot of the members of `room`.
    ///
    /// The returned list is detached from the registry, so callers may keep
    /// iterating it while joins and leaves continue.
    pub fn members(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Rooms `connection` is currently in, sorted.
    pub fn rooms_of(&self, connection: ConnectionId) -> Vec<RoomId> {
        let sorted: BTreeSet<&RoomId> = self
            .memberships
            .get(&connection)
            .map(|joined| joined.iter().collect())
            .unwrap_or_default();
        sorted.into_iter().cloned().collect()
    }

    pub fn is_member(&self, connection: ConnectionId, room: &RoomId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(&connection))
    }

    /// True while `room` has at least one member.
    pub fn contains(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    /// Number of live (non-empty) rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of connections holding at least one membership.
    pub fn connection_count(&self) -> usize {
        self.memberships.len()
    }

    /// Drop every membership.
    pub fn clear(&mut self) {
        self.rooms.clear();
        self.memberships.clear();
    }
}
