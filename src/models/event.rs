use serde::{Deserialize, Serialize};

use super::Message;

/// Emitted after a message has been persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum MessageEvent {
    Inserted(Message),
}

impl MessageEvent {
    pub fn message(&self) -> &Message {
        match self {
            MessageEvent::Inserted(msg) => msg,
        }
    }
}
