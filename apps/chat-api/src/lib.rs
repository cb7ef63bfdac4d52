pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod history;
pub mod id;
pub mod models;
pub mod routes;
pub mod sessions;

use std::sync::Arc;

use gateway::fanout::ChatBroadcast;
use gateway::registry::RoomRegistry;
use history::HistoryStore;
use sessions::SessionStore;

/// Shared application state available to all route handlers and the gateway.
#[derive(Clone)]
pub struct AppState {
    pub history: HistoryStore,
    pub sessions: SessionStore,
    pub rooms: Arc<RoomRegistry>,
    pub broadcast: ChatBroadcast,
}
