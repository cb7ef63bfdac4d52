//! Session-scoped identity: binds an opaque cookie token to a display name.
//!
//! The HTTP path writes the binding (`POST /set-username`) and the gateway
//! handshake reads it, so both sides must key off the same cookie token. The
//! session store outlives any single connection.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::db::kv::KeyValueStore;
use crate::error::ApiError;

/// Cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "chat_session";

/// Sessions expire one hour after creation.
pub const SESSION_TTL_SECS: u64 = 3600;

/// Generate an opaque random session token (`sess_` prefix).
pub fn generate_session_token() -> String {
    let mut buf = [0u8; 32];
    rand::thread_rng().fill(&mut buf[..]);
    format!("sess_{}", URL_SAFE_NO_PAD.encode(buf))
}

fn session_key(token: &str) -> String {
    format!("session_{token}")
}

/// The persisted session record. Only the username today, stored as JSON so
/// the record can grow.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

/// Stores and resolves the session → username binding.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Bind `name` to the session. Rejects names that are empty after
    /// trimming. Later calls overwrite — "set once" is a client convention,
    /// not a protocol guarantee.
    pub async fn set_username(&self, token: &str, name: &str) -> Result<(), ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::bad_request("Username required"));
        }

        let record = SessionRecord {
            username: Some(name.to_string()),
        };
        let serialized = serde_json::to_string(&record)?;
        self.kv
            .set_ex(&session_key(token), &serialized, SESSION_TTL_SECS)
            .await
    }

    /// Look up the username bound to the session, if any.
    pub async fn username(&self, token: &str) -> Result<Option<String>, ApiError> {
        let Some(raw) = self.kv.get(&session_key(token)).await? else {
            return Ok(None);
        };
        let record: SessionRecord = serde_json::from_str(&raw)?;
        Ok(record.username)
    }
}
