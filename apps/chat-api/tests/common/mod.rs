use std::net::SocketAddr;
use std::sync::Arc;

use chat_api::db::kv::{KeyValueStore, MemoryStore};
use chat_api::gateway::fanout::ChatBroadcast;
use chat_api::gateway::registry::RoomRegistry;
use chat_api::history::HistoryStore;
use chat_api::sessions::SessionStore;
use chat_api::AppState;

/// Build an AppState over the in-memory key-value store.
pub fn test_state() -> AppState {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    AppState {
        history: HistoryStore::new(kv.clone()),
        sessions: SessionStore::new(kv),
        rooms: Arc::new(RoomRegistry::new()),
        broadcast: ChatBroadcast::new(),
    }
}

/// Start a real TCP server for WebSocket and HTTP testing.
/// Returns (addr, state). The server runs in the background.
pub async fn start_server() -> (SocketAddr, AppState) {
    let state = test_state();
    let app = chat_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}
