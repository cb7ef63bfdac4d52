//! Broadcast hub for dispatching events to connected clients.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connection subscribes
//! and filters payloads against its own room membership, which keeps the
//! single-process fan-out simple.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::events::ServerEvent;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip payloads (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// A payload fanned out to connected clients.
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    /// The room this event belongs to; only its members receive it.
    pub room: String,
    /// Connection id to skip, for sender-exclusive relays (join notice,
    /// typing). `None` delivers to the full room, sender included.
    pub exclude: Option<String>,
    /// The event to deliver.
    pub event: ServerEvent,
}

/// The global broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct ChatBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl ChatBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the hub. Each connection calls this once at handshake.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    /// Dispatch an event to all subscribed connections.
    pub fn dispatch(&self, payload: BroadcastPayload) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_dispatched_payloads() {
        let hub = ChatBroadcast::new();
        let mut rx = hub.subscribe();

        hub.dispatch(BroadcastPayload {
            room: "global".to_string(),
            exclude: None,
            event: ServerEvent::typing(),
        });

        let payload = rx.recv().await.unwrap();
        assert_eq!(payload.room, "global");
        assert!(payload.exclude.is_none());
        assert_eq!(payload.event.event, "typing");
    }

    #[tokio::test]
    async fn dispatch_without_receivers_is_a_noop() {
        let hub = ChatBroadcast::new();
        hub.dispatch(BroadcastPayload {
            room: "global".to_string(),
            exclude: None,
            event: ServerEvent::typing(),
        });
    }
}
