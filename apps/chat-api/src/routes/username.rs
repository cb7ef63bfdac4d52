//! Session username binding.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::error::ApiError;
use crate::sessions::{generate_session_token, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/set-username", post(set_username))
}

#[derive(Debug, Deserialize)]
pub struct SetUsernameRequest {
    #[serde(default)]
    pub username: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /set-username
// ---------------------------------------------------------------------------

async fn set_username(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SetUsernameRequest>,
) -> Result<(CookieJar, StatusCode), ApiError> {
    // Reuse the caller's session if the cookie is present; mint one otherwise.
    // The cookie is only committed on success, so a rejected name leaves the
    // caller without a session, as before.
    let (token, jar) = match jar.get(SESSION_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), jar),
        None => {
            let token = generate_session_token();
            let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
                .path("/")
                .http_only(true)
                .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
                .build();
            (token, jar.add(cookie))
        }
    };

    state
        .sessions
        .set_username(&token, body.username.as_deref().unwrap_or_default())
        .await?;

    Ok((jar, StatusCode::OK))
}
