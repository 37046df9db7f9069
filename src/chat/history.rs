#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use crate::{
    config::constants::MAX_HISTORY_MESSAGES,
    models::TranscriptMessage,
    storage::ArcStorage,
};

/// Builds the transcript for a turn from the stored conversation window.
pub struct HistoryAssembler {
    storage: ArcStorage,
    max_messages: usize,
}

impl HistoryAssembler {
    pub fn new(storage: ArcStorage) -> Self {
        Self {
            storage,
            max_messages: MAX_HISTORY_MESSAGES,
        }
    }

    /// Caps the window below the default. Larger values are clamped.
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages.min(MAX_HISTORY_MESSAGES);
        self
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Returns up to `max_messages` prior turns, oldest first, followed by
    /// `message`. Falls back to the single current turn when retention is off,
    /// there is no conversation yet, or history cannot be read.
    pub async fn assemble(
        &self,
        conversation_id: Option<&str>,
        retention: bool,
        message: &str,
    ) -> Vec<TranscriptMessage> {
        let current = TranscriptMessage::user(message);

        let conversation_id = match conversation_id {
            Some(id) if retention => id,
            _ => return vec![current],
        };

        let history = match self
            .storage
            .get_recent_messages(conversation_id, self.max_messages)
            .await
        {
            Ok(history) => history,
            Err(err) => {
                log::warn!(
                    "Failed to load history for conversation {}: {:?}",
                    conversation_id,
                    err
                );
                return vec![current];
            }
        };

        let skip = history.len().saturating_sub(self.max_messages);
        let mut transcript = history
            .iter()
            .skip(skip)
            .map(TranscriptMessage::from)
            .collect::<Vec<_>>();
        transcript.push(current);
        transcript
    }
}
