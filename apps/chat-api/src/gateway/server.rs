//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::error::ApiError;
use crate::sessions::SESSION_COOKIE;
use crate::AppState;

use super::connection::Connection;
use super::events::{ClientEvent, ServerEvent};
use super::fanout::BroadcastPayload;
use super::handler;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    jar: CookieJar,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // The gateway reads the same cookie the /set-username handler wrote, so
    // both paths resolve the same session record.
    let session_token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    ws.on_upgrade(move |socket| handle_connection(socket, state, session_token))
}

async fn handle_connection(socket: WebSocket, state: AppState, session_token: Option<String>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut conn = Connection::new(session_token);
    let mut broadcast_rx = state.broadcast.subscribe();

    tracing::info!(conn_id = %conn.conn_id, "gateway connection opened");

    loop {
        tokio::select! {
            // Client sends us a frame.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event: ClientEvent = match serde_json::from_str(&text) {
                            Ok(event) => event,
                            Err(err) => {
                                // Channel-path failures stay invisible to the
                                // client; they only show up in diagnostics.
                                tracing::debug!(%err, conn_id = %conn.conn_id, "ignoring malformed frame");
                                continue;
                            }
                        };

                        match event {
                            ClientEvent::JoinRoom(payload) => {
                                match handler::handle_join(&state, &mut conn, payload).await {
                                    Ok(history) => {
                                        if send_event(&mut ws_tx, &history).await.is_err() {
                                            break;
                                        }
                                    }
                                    Err(err) => {
                                        tracing::error!(?err, conn_id = %conn.conn_id, "join_room failed");
                                    }
                                }
                            }
                            ClientEvent::SendMessage(payload) => {
                                if let Err(err) = handler::handle_send(&state, &conn, payload).await {
                                    tracing::error!(?err, conn_id = %conn.conn_id, "send_message failed");
                                }
                            }
                            ClientEvent::Typing(room) => {
                                handler::handle_typing(&state, &conn, room);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(?err, conn_id = %conn.conn_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Payload from the fanout hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        if !should_deliver(&state, &conn, &payload) {
                            continue;
                        }
                        if send_event(&mut ws_tx, &payload.event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            conn_id = %conn.conn_id,
                            skipped,
                            "connection lagged behind broadcast"
                        );
                        // Continue — the missed events are simply dropped.
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Membership is released by the transport lifecycle alone; no leave
    // notice goes out (asymmetric with join — see DESIGN.md).
    state.rooms.remove_connection(&conn.conn_id);
    tracing::info!(conn_id = %conn.conn_id, "gateway connection closed");
}

/// Whether a fanout payload should reach this connection: the connection must
/// be a member of the payload's room and must not be the excluded sender.
fn should_deliver(state: &AppState, conn: &Connection, payload: &BroadcastPayload) -> bool {
    if payload.exclude.as_deref() == Some(conn.conn_id.as_str()) {
        return false;
    }
    state.rooms.contains(&payload.room, &conn.conn_id)
}

async fn send_event(
    ws_tx: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), ApiError> {
    let frame = event.to_json()?;
    ws_tx
        .send(Message::Text(frame.into()))
        .await
        .map_err(|err| ApiError::internal(err.to_string()))
}
