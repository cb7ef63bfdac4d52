//! The immutable chat message record.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Author name carried by server-generated notices.
pub const SYSTEM_USERNAME: &str = "SYSTEM";

/// Fallback author name when neither the payload nor the connection carries one.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// A single chat message, as persisted in the room log and as delivered in
/// `receive_message` events.
///
/// Messages never mutate after creation; ordering is append order within a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
    pub room: String,
    /// ISO-8601, assigned by the server at receipt.
    pub timestamp: String,
}

impl ChatMessage {
    /// Build a message with a fresh server-assigned timestamp.
    pub fn now(
        username: impl Into<String>,
        message: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
            room: room.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// The `SYSTEM` notice delivered to a room's other members on join.
    pub fn join_notice(room: impl Into<String>) -> Self {
        Self::now(SYSTEM_USERNAME, "A user joined the room", room)
    }
}
