//! Explicit room membership: which connections are joined to which room.

use std::collections::HashSet;

use dashmap::DashMap;

/// Maps a room key to the set of connection ids currently joined to it.
///
/// Membership has exactly two mutators: join and disconnect. Rooms come into
/// existence on first join and vanish when their last member disconnects;
/// there is no other lifecycle.
pub struct RoomRegistry {
    rooms: DashMap<String, HashSet<String>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a connection to a room. Re-joining is a no-op at this level.
    pub fn join(&self, room: &str, conn_id: &str) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id.to_string());
    }

    /// Whether the connection is currently a member of the room.
    pub fn contains(&self, room: &str, conn_id: &str) -> bool {
        self.rooms
            .get(room)
            .map(|members| members.contains(conn_id))
            .unwrap_or(false)
    }

    /// Release every membership held by a connection. Called once, on
    /// disconnect.
    pub fn remove_connection(&self, conn_id: &str) {
        self.rooms.retain(|_, members| {
            members.remove(conn_id);
            !members.is_empty()
        });
    }

    /// Number of connections currently joined to the room.
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(|members| members.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_and_contains() {
        let registry = RoomRegistry::new();
        registry.join("global", "conn_a");

        assert!(registry.contains("global", "conn_a"));
        assert!(!registry.contains("global", "conn_b"));
        assert!(!registry.contains("other", "conn_a"));
    }

    #[test]
    fn rejoin_is_idempotent() {
        let registry = RoomRegistry::new();
        registry.join("global", "conn_a");
        registry.join("global", "conn_a");

        assert_eq!(registry.member_count("global"), 1);
    }

    #[test]
    fn remove_connection_releases_all_memberships() {
        let registry = RoomRegistry::new();
        registry.join("red", "conn_a");
        registry.join("blue", "conn_a");
        registry.join("blue", "conn_b");

        registry.remove_connection("conn_a");

        assert!(!registry.contains("red", "conn_a"));
        assert!(!registry.contains("blue", "conn_a"));
        assert!(registry.contains("blue", "conn_b"));
        assert_eq!(registry.member_count("red"), 0);
        assert_eq!(registry.member_count("blue"), 1);
    }

    #[test]
    fn unknown_room_is_empty() {
        let registry = RoomRegistry::new();
        assert_eq!(registry.member_count("nowhere"), 0);
        assert!(!registry.contains("nowhere", "conn_a"));
    }

    #[test]
    fn connections_can_hold_multiple_rooms() {
        let registry = RoomRegistry::new();
        registry.join("red", "conn_a");
        registry.join("blue", "conn_a");

        assert!(registry.contains("red", "conn_a"));
        assert!(registry.contains("blue", "conn_a"));
    }
}
