//! Bounded per-room message log backed by the key-value service.

use std::sync::Arc;

use crate::db::kv::KeyValueStore;
use crate::error::ApiError;
use crate::models::message::ChatMessage;

/// Maximum number of messages retained per room.
pub const HISTORY_WINDOW: usize = 100;

fn room_key(room: &str) -> String {
    format!("chat_{room}")
}

/// Append-only, trimmed view over each room's message log.
///
/// The log is a sliding window of the last [`HISTORY_WINDOW`] messages; there
/// is no time-based expiry and no per-message deletion. The key-value
/// service's atomic append is the only cross-connection safety mechanism —
/// concurrent sends to the same room interleave in whatever order their
/// appends land.
#[derive(Clone)]
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Append a message to the room's log, then trim the log to the most
    /// recent [`HISTORY_WINDOW`] entries, oldest-first order preserved.
    pub async fn append(&self, room: &str, message: &ChatMessage) -> Result<(), ApiError> {
        let key = room_key(room);
        let serialized = serde_json::to_string(message)?;
        self.kv.list_push(&key, &serialized).await?;
        self.kv.list_trim_last(&key, HISTORY_WINDOW).await
    }

    /// The room's full retained log in insertion order, oldest first. Empty if
    /// the room has no history.
    pub async fn get_all(&self, room: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let raw = self.kv.list_range_all(&room_key(room)).await?;
        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(ApiError::from))
            .collect()
    }
}
