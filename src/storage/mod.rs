pub mod sqlite;

use std::sync::Arc;

use crate::{
    config::{StorageConfig, resolve_path},
    models::{Conversation, CrisisFlag, Message, Profile},
};
use async_trait::async_trait;
use eyre::{Context, Result};
use sqlite::Sqlite;

#[cfg(test)]
use mockall::automock;

/// Relational storage for profiles, conversations, messages and crisis flags.
///
/// Callers enforce ownership; the storage layer does not filter by user
/// except where a method takes a `user_id`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Storage {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;
    async fn upsert_profile(&self, profile: Profile) -> Result<()>;

    async fn create_conversation(&self, conversation: Conversation) -> Result<()>;
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;
    async fn get_conversations(&self, user_id: &str) -> Result<Vec<Conversation>>;
    /// Deletes every conversation of the user together with its messages.
    /// Returns the number of conversations removed.
    async fn delete_conversations(&self, user_id: &str) -> Result<usize>;

    async fn add_message(&self, message: Message) -> Result<()>;
    /// All messages of a conversation, oldest first.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;
    /// The newest `limit` messages of a conversation, returned oldest first.
    async fn get_recent_messages(&self, conversation_id: &str, limit: usize)
    -> Result<Vec<Message>>;

    async fn add_crisis_flag(&self, flag: CrisisFlag) -> Result<()>;
    async fn get_crisis_flags(&self, conversation_id: &str) -> Result<Vec<CrisisFlag>>;
}

pub type ArcStorage = Arc<dyn Storage + Send + Sync>;

pub async fn new_storage(config: &StorageConfig) -> Result<ArcStorage> {
    let storage = match config {
        StorageConfig::Sqlite(sqlite_config) => {
            let path = match sqlite_config.path.as_deref() {
                Some(path) => Some(resolve_path(path).wrap_err("resolving database path")?),
                None => None,
            };
            Arc::new(Sqlite::new(path.as_deref()).await?)
        }
    };
    Ok(storage)
}
