use tokio::sync::broadcast;

use crate::{config::constants::EVENT_CHANNEL_CAPACITY, models::MessageEvent};

/// In-process fan-out of persisted messages to connected clients.
#[derive(Clone)]
pub struct MessageEvents {
    tx: broadcast::Sender<MessageEvent>,
}

impl MessageEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: MessageEvent) {
        // No subscribers is not an error.
        if let Ok(n) = self.tx.send(event) {
            log::trace!("Message event delivered to {} subscribers", n);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.tx.subscribe()
    }
}

impl Default for MessageEvents {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}
