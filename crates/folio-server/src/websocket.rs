//! Messages pushed to live preview clients.

use std::future::Future;

use axum::extract::ws::{Message, WebSocket};
use serde::{Deserialize, Serialize};

/// Messages sent to a draft page over its live socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Connection established
    Connected,

    /// Replace the post section
    Update {
        /// Rendered post section
        html: String,
    },
}

impl LiveMessage {
    /// Send the message as a JSON text frame. Returns `false` once the
    /// socket is gone.
    pub async fn send(&self, socket: &mut WebSocket) -> bool {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to encode live message: {}", e);
                return true;
            }
        };

        socket.send(Message::Text(json.into())).await.is_ok()
    }
}

/// The page end of a live session.
pub trait LiveSink: Send {
    /// Deliver a message. Returns `false` once the page is gone.
    fn send(&mut self, msg: LiveMessage) -> impl Future<Output = bool> + Send;

    /// Resolves when the page disconnects. Must be cancel safe.
    fn closed(&mut self) -> impl Future<Output = ()> + Send;
}

impl LiveSink for WebSocket {
    async fn send(&mut self, msg: LiveMessage) -> bool {
        msg.send(self).await
    }

    async fn closed(&mut self) {
        while let Some(Ok(message)) = self.recv().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    }
}
