#[cfg(test)]
#[path = "router_test.rs"]
mod tests;

use std::{future::Future, sync::Arc};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    backend::{ArcCompletion, CompletionError},
    chat::{HistoryAssembler, MessageEvents},
    config::constants::MAX_MESSAGE_BYTES,
    crisis::{CrisisDetector, SAFETY_MESSAGE},
    models::{ChatRequest, ChatResponse, Conversation, CrisisFlag, Message, MessageEvent, User},
    storage::ArcStorage,
};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("message exceeds {0} bytes")]
    MessageTooLarge(usize),

    #[error("conversation not found")]
    ConversationNotFound,

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Handles one chat turn.
///
/// Each turn is either `CRISIS` (safety script, no model call) or `NORMAL`
/// (history + completion). Nothing is carried between turns except what
/// is persisted. Conversations and messages are only written for users with
/// history retention enabled; crisis flags are always written. Every write is
/// best-effort: failures are logged and never change the reply.
pub struct ResponseRouter {
    detector: Arc<CrisisDetector>,
    storage: ArcStorage,
    completion: ArcCompletion,
    history: HistoryAssembler,
    events: MessageEvents,
}

/// Where the turn's messages go, if anywhere.
struct TurnTarget {
    conversation_id: Option<String>,
    /// Conversation row existed before this turn.
    existing: bool,
    /// Turn messages should be written.
    persist: bool,
}

impl TurnTarget {
    /// No stored conversation and nothing to persist.
    fn detached() -> Self {
        Self {
            conversation_id: None,
            existing: false,
            persist: false,
        }
    }
}

impl ResponseRouter {
    pub fn new(
        detector: Arc<CrisisDetector>,
        storage: ArcStorage,
        completion: ArcCompletion,
        events: MessageEvents,
    ) -> Self {
        Self {
            detector,
            history: HistoryAssembler::new(storage.clone()),
            storage,
            completion,
            events,
        }
    }

    pub async fn handle(&self, user: &User, req: ChatRequest) -> Result<ChatResponse, ChatError> {
        let message = req.message;
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.len() > MAX_MESSAGE_BYTES {
            return Err(ChatError::MessageTooLarge(MAX_MESSAGE_BYTES));
        }

        let requested = req.conversation_id.filter(|id| !id.trim().is_empty());

        let crisis = self.detector.first_match(&message);
        let retention = self.retention(user).await;
        let target = match self.resolve_target(user, requested, retention).await {
            Ok(target) => target,
            // A crisis turn always gets the safety script, never an error.
            Err(ChatError::ConversationNotFound) if crisis.is_some() => TurnTarget::detached(),
            Err(err) => return Err(err),
        };

        if let Some(pattern) = crisis {
            // Flags are recorded even when no conversation is stored.
            let conversation_id = target
                .conversation_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            log::warn!(
                "Crisis language detected (intent: {}, conversation: {})",
                pattern.intent(),
                conversation_id
            );

            let flag = CrisisFlag::pattern_match(&conversation_id, Some(pattern.intent()));
            best_effort("recording crisis flag", self.storage.add_crisis_flag(flag)).await;

            self.persist_turn(&target, &message).await;
            self.persist_reply(&target, SAFETY_MESSAGE).await;

            return Ok(ChatResponse {
                response: SAFETY_MESSAGE.to_string(),
                is_crisis: true,
                conversation_id: Some(conversation_id),
            });
        }

        let history_id = target
            .conversation_id
            .as_deref()
            .filter(|_| target.existing);
        let transcript = self.history.assemble(history_id, retention, &message).await;

        self.persist_turn(&target, &message).await;

        log::debug!(
            "Requesting completion from {} with {} messages",
            self.completion.name(),
            transcript.len()
        );
        let reply = self.completion.complete(&transcript).await?;

        self.persist_reply(&target, &reply).await;

        Ok(ChatResponse {
            response: reply,
            is_crisis: false,
            conversation_id: target.conversation_id,
        })
    }

    /// Retention defaults to off when the profile is missing or unreadable.
    async fn retention(&self, user: &User) -> bool {
        match self.storage.get_profile(user.id()).await {
            Ok(profile) => profile.map(|p| p.save_chats()).unwrap_or(false),
            Err(err) => {
                log::warn!("Failed to read profile of user {}: {:?}", user.id(), err);
                false
            }
        }
    }

    async fn resolve_target(
        &self,
        user: &User,
        requested: Option<String>,
        retention: bool,
    ) -> Result<TurnTarget, ChatError> {
        let stored = match requested.as_deref() {
            Some(id) => self.lookup_conversation(user, id).await?,
            None => None,
        };

        if stored.is_some() {
            return Ok(TurnTarget {
                conversation_id: requested,
                existing: true,
                persist: retention,
            });
        }

        if !retention {
            return Ok(TurnTarget {
                conversation_id: requested,
                existing: false,
                persist: false,
            });
        }

        let mut conversation = Conversation::new(user.id());
        if let Some(id) = requested.as_deref() {
            conversation = conversation.with_id(id);
        }
        let id = conversation.id().to_string();

        let created = best_effort(
            "creating conversation",
            self.storage.create_conversation(conversation),
        )
        .await;
        if created {
            log::debug!("Created conversation {} for user {}", id, user.id());
        }

        Ok(TurnTarget {
            conversation_id: if created { Some(id) } else { requested },
            existing: false,
            persist: created,
        })
    }

    async fn lookup_conversation(
        &self,
        user: &User,
        id: &str,
    ) -> Result<Option<Conversation>, ChatError> {
        match self.storage.get_conversation(id).await {
            Ok(Some(conversation)) if !conversation.is_owned_by(user.id()) => {
                log::warn!(
                    "User {} referenced conversation {} owned by another user",
                    user.id(),
                    id
                );
                Err(ChatError::ConversationNotFound)
            }
            Ok(conversation) => Ok(conversation),
            Err(err) => {
                log::warn!("Failed to look up conversation {}: {:?}", id, err);
                Ok(None)
            }
        }
    }

    async fn persist_turn(&self, target: &TurnTarget, content: &str) {
        let Some(id) = target.conversation_id.as_deref().filter(|_| target.persist) else {
            return;
        };
        let message = Message::new_user(id, content);
        best_effort("saving user message", self.storage.add_message(message)).await;
    }

    async fn persist_reply(&self, target: &TurnTarget, content: &str) {
        let Some(id) = target.conversation_id.as_deref().filter(|_| target.persist) else {
            return;
        };
        let message = Message::new_assistant(id, content);
        if best_effort(
            "saving assistant message",
            self.storage.add_message(message.clone()),
        )
        .await
        {
            self.events.publish(MessageEvent::Inserted(message));
        }
    }
}

async fn best_effort<F>(what: &str, fut: F) -> bool
where
    F: Future<Output = eyre::Result<()>>,
{
    match fut.await {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Best-effort write failed while {}: {:?}", what, err);
            false
        }
    }
}
