pub mod health;
pub mod username;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(username::router())
        .merge(crate::gateway::server::router())
}
