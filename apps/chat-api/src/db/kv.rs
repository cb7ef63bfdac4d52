use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ApiError;

/// Abstraction over the key-value service backing sessions and room logs.
///
/// Backed by Redis in production and an in-memory map in tests. String
/// operations carry the session records; list operations carry the per-room
/// message logs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ApiError>;
    async fn get(&self, key: &str) -> Result<Option<String>, ApiError>;
    /// Append a value to the tail of the list at `key`.
    async fn list_push(&self, key: &str, value: &str) -> Result<(), ApiError>;
    /// Trim the list at `key` to its most recent `count` elements.
    async fn list_trim_last(&self, key: &str, count: usize) -> Result<(), ApiError>;
    /// The full list at `key`, oldest first. Empty if the key is absent.
    async fn list_range_all(&self, key: &str) -> Result<Vec<String>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (for tests)
// ---------------------------------------------------------------------------

pub struct MemoryStore {
    strings: Mutex<HashMap<String, String>>,
    lists: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            strings: Mutex::new(HashMap::new()),
            lists: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_ex(&self, key: &str, value: &str, _ttl_secs: u64) -> Result<(), ApiError> {
        self.strings
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.strings.lock().unwrap().get(key).cloned())
    }

    async fn list_push(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.lists
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }

    async fn list_trim_last(&self, key: &str, count: usize) -> Result<(), ApiError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(list) = lists.get_mut(key) {
            if list.len() > count {
                let excess = list.len() - count;
                list.drain(..excess);
            }
        }
        Ok(())
    }

    async fn list_range_all(&self, key: &str) -> Result<Vec<String>, ApiError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Failure doubles (for tests)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub mod doubles {
    use super::*;

    /// Store whose every operation fails, for exercising persistence-failure
    /// paths.
    pub struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), ApiError> {
            Err(ApiError::internal("kv unavailable"))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, ApiError> {
            Err(ApiError::internal("kv unavailable"))
        }

        async fn list_push(&self, _key: &str, _value: &str) -> Result<(), ApiError> {
            Err(ApiError::internal("kv unavailable"))
        }

        async fn list_trim_last(&self, _key: &str, _count: usize) -> Result<(), ApiError> {
            Err(ApiError::internal("kv unavailable"))
        }

        async fn list_range_all(&self, _key: &str) -> Result<Vec<String>, ApiError> {
            Err(ApiError::internal("kv unavailable"))
        }
    }

    /// Store whose list reads return fixed raw entries, for exercising reads
    /// over entries the server never wrote.
    pub struct RawListStore {
        pub entries: Vec<String>,
    }

    #[async_trait]
    impl KeyValueStore for RawListStore {
        async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), ApiError> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, ApiError> {
            Ok(None)
        }

        async fn list_push(&self, _key: &str, _value: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_trim_last(&self, _key: &str, _count: usize) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_range_all(&self, _key: &str) -> Result<Vec<String>, ApiError> {
            Ok(self.entries.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Redis implementation
// ---------------------------------------------------------------------------

pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis. The connection manager reconnects automatically, so
    /// this handle lives for the whole process.
    pub async fn connect(redis_url: &str) -> Result<Self, ApiError> {
        let client = redis::Client::open(redis_url)?;
        let conn = redis::aio::ConnectionManager::new(client).await?;
        tracing::info!("redis connection established");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ApiError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn list_push(&self, key: &str, value: &str) -> Result<(), ApiError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn list_trim_last(&self, key: &str, count: usize) -> Result<(), ApiError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.ltrim::<_, ()>(key, -(count as isize), -1).await?;
        Ok(())
    }

    async fn list_range_all(&self, key: &str) -> Result<Vec<String>, ApiError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        Ok(conn.lrange(key, 0, -1).await?)
    }
}
