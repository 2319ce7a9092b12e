//! Room key → subscriber map.
//!
//! Holds at most one connection per `(user, room)`. A room key exists only
//! while it has at least one subscriber. All operations take the same lock
//! and none of them sends.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::gauge;
use nakuma_core::{ConnectionId, RoomKey, UserId};
use parking_lot::Mutex;
use tracing::debug;

use super::connection::Connection;
use crate::metrics::HUB_ROOMS_ACTIVE;

type Room = HashMap<UserId, Arc<dyn Connection>>;

/// Registry of room subscriptions.
#[derive(Default)]
pub struct ConnectionRegistry {
    rooms: Mutex<HashMap<RoomKey, Room>>,
}

impl ConnectionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `conn` to `room` on behalf of `user`, replacing any
    /// connection the user already had there.
    pub fn register(&self, user: &UserId, conn: Arc<dyn Connection>, room: &RoomKey) {
        let mut rooms = self.rooms.lock();
        let replaced = rooms
            .entry(room.clone())
            .or_default()
            .insert(user.clone(), conn)
            .is_some();
        debug!(%room, user_id = %user, replaced, "registered subscription");
        gauge!(HUB_ROOMS_ACTIVE).set(rooms.len() as f64);
    }

    /// Remove `user` from `room` whatever connection it is on.
    pub fn unregister(&self, user: &UserId, room: &RoomKey) -> bool {
        self.remove(user, room, None)
    }

    /// Remove `user` from `room` only if `conn` is still the registered
    /// connection. Dispatcher pruning and disconnect teardown go through
    /// here so a stale connection never evicts a newer one.
    pub fn unregister_connection(&self, user: &UserId, room: &RoomKey, conn: &ConnectionId) -> bool {
        self.remove(user, room, Some(conn))
    }

    fn remove(&self, user: &UserId, room: &RoomKey, expected: Option<&ConnectionId>) -> bool {
        let mut rooms = self.rooms.lock();
        let Some(members) = rooms.get_mut(room) else {
            return false;
        };
        let matches = members
            .get(user)
            .is_some_and(|c| expected.is_none_or(|id| c.id() == id));
        if !matches {
            return false;
        }
        let _ = members.remove(user);
        if members.is_empty() {
            let _ = rooms.remove(room);
            debug!(%room, "room emptied");
        }
        gauge!(HUB_ROOMS_ACTIVE).set(rooms.len() as f64);
        true
    }

    /// Snapshot of the room's subscribers.
    pub fn lookup(&self, room: &RoomKey) -> Vec<(UserId, Arc<dyn Connection>)> {
        self.rooms
            .lock()
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .map(|(user, conn)| (user.clone(), Arc::clone(conn)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of rooms with at least one subscriber.
    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }

    /// Subscribers currently in `room`.
    pub fn subscriber_count(&self, room: &RoomKey) -> usize {
        self.rooms.lock().get(room).map_or(0, HashMap::len)
    }

    /// Whether `room` has any subscriber.
    pub fn contains_room(&self, room: &RoomKey) -> bool {
        self.rooms.lock().contains_key(room)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
