//! Inbound event dispatch: join, send, and typing.

use crate::error::ApiError;
use crate::models::message::{ChatMessage, ANONYMOUS_USERNAME};
use crate::AppState;

use super::connection::Connection;
use super::events::{JoinRoomPayload, SendMessagePayload, ServerEvent};
use super::fanout::BroadcastPayload;

/// Ordered username resolution for outgoing messages: explicit payload value,
/// then the name bound to the connection at join, then the anonymous default.
/// Empty strings fall through, they never win.
fn resolve_username(payload: Option<&str>, bound: Option<&str>) -> String {
    payload
        .filter(|name| !name.is_empty())
        .or_else(|| bound.filter(|name| !name.is_empty()))
        .unwrap_or(ANONYMOUS_USERNAME)
        .to_string()
}

/// Process a `join_room` event.
///
/// In order: bind the connection's username (payload first, session record as
/// fallback), register the membership, read the room's history, and notify
/// the room's *other* members. Returns the `chat_history` replay, which goes
/// to the joining connection alone.
pub async fn handle_join(
    state: &AppState,
    conn: &mut Connection,
    payload: JoinRoomPayload,
) -> Result<ServerEvent, ApiError> {
    let username = match payload.username {
        Some(name) => Some(name),
        None => match &conn.session_token {
            Some(token) => state.sessions.username(token).await?,
            None => None,
        },
    };
    conn.username = username;

    state.rooms.join(&payload.room, &conn.conn_id);

    let history = state.history.get_all(&payload.room).await?;

    state.broadcast.dispatch(BroadcastPayload {
        room: payload.room.clone(),
        exclude: Some(conn.conn_id.clone()),
        event: ServerEvent::receive_message(&ChatMessage::join_notice(&payload.room))?,
    });

    tracing::debug!(
        conn_id = %conn.conn_id,
        room = %payload.room,
        username = conn.username.as_deref().unwrap_or(""),
        replayed = history.len(),
        "connection joined room"
    );

    ServerEvent::chat_history(&history)
}

/// Process a `send_message` event. An empty or absent room or message is
/// silently dropped — no error reaches the sender.
pub async fn handle_send(
    state: &AppState,
    conn: &Connection,
    payload: SendMessagePayload,
) -> Result<(), ApiError> {
    tracing::debug!(?payload, conn_id = %conn.conn_id, "send_message received");

    let room = payload.room.filter(|r| !r.is_empty());
    let message = payload.message.filter(|m| !m.trim().is_empty());
    let (Some(room), Some(message)) = (room, message) else {
        return Ok(());
    };

    let username = resolve_username(payload.username.as_deref(), conn.username.as_deref());
    let msg = ChatMessage::now(username, message, room.clone());

    // Broadcast only after the append succeeds; a persistence failure aborts
    // the event and nobody hears about the message.
    state.history.append(&room, &msg).await?;

    state.broadcast.dispatch(BroadcastPayload {
        room,
        exclude: None,
        event: ServerEvent::receive_message(&msg)?,
    });

    Ok(())
}

/// Process a `typing` event: a stateless relay to the room's other members.
/// Nothing is persisted and there is no debouncing.
pub fn handle_typing(state: &AppState, conn: &Connection, room: String) {
    state.broadcast.dispatch(BroadcastPayload {
        room,
        exclude: Some(conn.conn_id.clone()),
        event: ServerEvent::typing(),
    });
}
