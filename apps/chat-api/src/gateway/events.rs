//! Wire-format events exchanged over the gateway WebSocket.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::message::ChatMessage;

// ---------------------------------------------------------------------------
// Client → Server events
// ---------------------------------------------------------------------------

/// An event received from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    SendMessage(SendMessagePayload),
    /// Payload is the bare room string, not an object.
    Typing(String),
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomPayload {
    pub room: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// `room` and `message` stay optional here: an empty or absent value means
/// the event is silently dropped, never rejected.
#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Event names sent to clients.
pub struct EventName;

impl EventName {
    pub const CHAT_HISTORY: &'static str = "chat_history";
    pub const RECEIVE_MESSAGE: &'static str = "receive_message";
    pub const TYPING: &'static str = "typing";
}

/// An event sent from the server to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ServerEvent {
    pub event: &'static str,
    pub data: Value,
}

impl ServerEvent {
    /// The room's retained history, replayed once per join. Replaces any
    /// prior rendering on the client.
    pub fn chat_history(messages: &[ChatMessage]) -> Result<Self, ApiError> {
        Ok(Self {
            event: EventName::CHAT_HISTORY,
            data: serde_json::to_value(messages)?,
        })
    }

    /// A single message: a send echo or the synthetic join notice.
    pub fn receive_message(message: &ChatMessage) -> Result<Self, ApiError> {
        Ok(Self {
            event: EventName::RECEIVE_MESSAGE,
            data: serde_json::to_value(message)?,
        })
    }

    /// A peer's typing relay. Carries no payload.
    pub fn typing() -> Self {
        Self {
            event: EventName::TYPING,
            data: Value::Null,
        }
    }

    /// Serialize the envelope for a WebSocket text frame.
    pub fn to_json(&self) -> Result<String, ApiError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_room_parses() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event": "join_room", "data": {"room": "global", "username": "alice"}}"#,
        )
        .unwrap();
        match event {
            ClientEvent::JoinRoom(payload) => {
                assert_eq!(payload.room, "global");
                assert_eq!(payload.username.as_deref(), Some("alice"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn join_room_username_is_optional() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event": "join_room", "data": {"room": "global"}}"#).unwrap();
        match event {
            ClientEvent::JoinRoom(payload) => assert!(payload.username.is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn send_message_fields_all_optional() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event": "send_message", "data": {}}"#).unwrap();
        match event {
            ClientEvent::SendMessage(payload) => {
                assert!(payload.room.is_none());
                assert!(payload.message.is_none());
                assert!(payload.username.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn typing_takes_bare_room_string() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event": "typing", "data": "global"}"#).unwrap();
        match event {
            ClientEvent::Typing(room) => assert_eq!(room, "global"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_fails_to_parse() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event": "leave_room", "data": {"room": "global"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn typing_event_serializes_with_null_data() {
        let value = serde_json::to_value(ServerEvent::typing()).unwrap();
        assert_eq!(value, serde_json::json!({ "event": "typing", "data": null }));
    }

    #[test]
    fn receive_message_envelope_shape() {
        let msg = ChatMessage::now("alice", "hi", "global");
        let value = serde_json::to_value(ServerEvent::receive_message(&msg).unwrap()).unwrap();
        assert_eq!(value["event"], "receive_message");
        assert_eq!(value["data"]["username"], "alice");
        assert_eq!(value["data"]["message"], "hi");
        assert_eq!(value["data"]["room"], "global");
        assert!(value["data"]["timestamp"].is_string());
    }

    #[test]
    fn chat_history_envelope_is_ordered_array() {
        let messages = vec![
            ChatMessage::now("alice", "first", "global"),
            ChatMessage::now("bob", "second", "global"),
        ];
        let value = serde_json::to_value(ServerEvent::chat_history(&messages).unwrap()).unwrap();
        assert_eq!(value["event"], "chat_history");
        assert_eq!(value["data"].as_array().unwrap().len(), 2);
        assert_eq!(value["data"][0]["message"], "first");
        assert_eq!(value["data"][1]["message"], "second");
    }
}
