//! Per-connection state.

use crate::id;

/// State for a single WebSocket connection.
///
/// Owned by the connection's event loop; nothing outside the loop mutates it.
pub struct Connection {
    /// Unique connection identifier (`conn_` prefixed ULID).
    pub conn_id: String,
    /// Session token extracted from the cookie at upgrade time, if present.
    pub session_token: Option<String>,
    /// Username bound at join time. Rebound on every join.
    pub username: Option<String>,
}

impl Connection {
    pub fn new(session_token: Option<String>) -> Self {
        Self {
            conn_id: id::prefixed_ulid(id::prefix::CONNECTION),
            session_token,
            username: None,
        }
    }
}
