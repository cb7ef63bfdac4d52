use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_api::config::Config;
use chat_api::db::kv::{KeyValueStore, RedisStore};
use chat_api::gateway::fanout::ChatBroadcast;
use chat_api::gateway::registry::RoomRegistry;
use chat_api::history::HistoryStore;
use chat_api::sessions::SessionStore;
use chat_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    // Redis backs both the room logs and the session records.
    let kv: Arc<dyn KeyValueStore> = Arc::new(
        RedisStore::connect(&config.redis_url)
            .await
            .expect("failed to connect to Redis"),
    );

    let state = AppState {
        history: HistoryStore::new(kv.clone()),
        sessions: SessionStore::new(kv),
        rooms: Arc::new(RoomRegistry::new()),
        broadcast: ChatBroadcast::new(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(chat_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "chat-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
