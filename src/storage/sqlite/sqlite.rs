#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;

use async_trait::async_trait;
use eyre::{Context, Result};
use tokio_rusqlite::{Connection, OpenFlags, Row, named_params, params};

use crate::models::{Conversation, CrisisFlag, Message, Profile, Sender};
use crate::storage::Storage;

use super::migration::MIGRATION;

pub struct Sqlite {
    conn: Connection,
}

impl Sqlite {
    pub async fn new(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )
            .await
            .wrap_err(format!("opening database path: {}", path))?,
            None => Connection::open_in_memory()
                .await
                .wrap_err("opening in-memory database")?,
        };

        let ret = Self { conn };
        ret.run_migration().await.wrap_err("running migration")?;
        Ok(ret)
    }

    async fn run_migration(&self) -> Result<()> {
        self.conn
            .call(|conn| Ok(conn.execute_batch(MIGRATION)?))
            .await
            .wrap_err("executing migration")?;
        Ok(())
    }
}

#[async_trait]
impl Storage for Sqlite {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let user_id = user_id.to_string();
        let profile = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT id, save_chats FROM profiles WHERE id = ?")?;
                let mut rows = stmt.query(params![user_id])?;

                let mut profile: Option<Profile> = None;
                if let Some(row) = rows.next()? {
                    let id: String = row.get(0)?;
                    let save_chats: i32 = row.get(1)?;
                    profile = Some(Profile::new(id).with_save_chats(save_chats == 1));
                }
                Ok(profile)
            })
            .await
            .wrap_err("getting profile")?;
        Ok(profile)
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO profiles (id, save_chats, updated_at)
                VALUES (:id, :save_chats, :updated_at)
                ON CONFLICT(id) DO UPDATE SET
                    save_chats = excluded.save_chats,
                    updated_at = excluded.updated_at
                "#,
                    named_params! {
                        ":id": profile.id(),
                        ":save_chats": profile.save_chats() as i32,
                        ":updated_at": chrono::Utc::now().timestamp_millis(),
                    },
                )?;
                Ok(())
            })
            .await
            .wrap_err("upserting profile")?;
        Ok(())
    }

    async fn create_conversation(&self, conversation: Conversation) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO conversations (id, user_id, created_at) VALUES (:id, :user_id, :created_at)",
                    named_params! {
                        ":id": conversation.id(),
                        ":user_id": conversation.user_id(),
                        ":created_at": conversation.created_at().timestamp_millis(),
                    },
                )?;
                Ok(())
            })
            .await
            .wrap_err("creating conversation")?;
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let id = id.to_string();
        let conversation = self
            .conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare("SELECT id, user_id, created_at FROM conversations WHERE id = ?")?;
                let mut rows = stmt.query(params![id])?;

                let mut conversation: Option<Conversation> = None;
                if let Some(row) = rows.next()? {
                    conversation = Some(read_conversation(row)?);
                }
                Ok(conversation)
            })
            .await
            .wrap_err("getting conversation")?;
        Ok(conversation)
    }

    async fn get_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let user_id = user_id.to_string();
        let conversations = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, created_at FROM conversations WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
                )?;
                let mut rows = stmt.query(params![user_id])?;

                let mut conversations = vec![];
                while let Some(row) = rows.next()? {
                    conversations.push(read_conversation(row)?);
                }
                Ok(conversations)
            })
            .await
            .wrap_err("getting conversations")?;
        Ok(conversations)
    }

    async fn delete_conversations(&self, user_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let deleted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let deleted =
                    tx.execute("DELETE FROM conversations WHERE user_id = ?", params![user_id])?;
                tx.commit()?;
                Ok(deleted)
            })
            .await
            .wrap_err("deleting conversations")?;
        Ok(deleted)
    }

    async fn add_message(&self, message: Message) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO messages (id, conversation_id, sender, content, created_at)
            VALUES (:id, :conversation_id, :sender, :content, :created_at)
            "#,
                    named_params! {
                        ":id": message.id(),
                        ":conversation_id": message.conversation_id(),
                        ":sender": message.sender().as_str(),
                        ":content": message.content(),
                        ":created_at": message.created_at().timestamp_millis(),
                    },
                )?;
                Ok(())
            })
            .await
            .wrap_err("adding message")?;
        Ok(())
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let conversation_id = conversation_id.to_string();
        let messages = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, conversation_id, sender, content, created_at FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, rowid ASC",
                )?;
                let mut rows = stmt.query(params![conversation_id])?;

                let mut messages = vec![];
                while let Some(row) = rows.next()? {
                    messages.push(read_message(row)?);
                }
                Ok(messages)
            })
            .await
            .wrap_err("getting messages")?;
        Ok(messages)
    }

    async fn get_recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let conversation_id = conversation_id.to_string();
        let limit = limit as i64;
        let mut messages = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, conversation_id, sender, content, created_at FROM messages WHERE conversation_id = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
                )?;
                let mut rows = stmt.query(params![conversation_id, limit])?;

                let mut messages = vec![];
                while let Some(row) = rows.next()? {
                    messages.push(read_message(row)?);
                }
                Ok(messages)
            })
            .await
            .wrap_err("getting recent messages")?;

        messages.reverse();
        Ok(messages)
    }

    async fn add_crisis_flag(&self, flag: CrisisFlag) -> Result<()> {
        let metadata =
            serde_json::to_string(flag.metadata()).wrap_err("serializing flag metadata")?;
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO crisis_flags (id, conversation_id, flag_type, metadata, created_at)
            VALUES (:id, :conversation_id, :flag_type, :metadata, :created_at)
            "#,
                    named_params! {
                        ":id": flag.id(),
                        ":conversation_id": flag.conversation_id(),
                        ":flag_type": flag.flag_type(),
                        ":metadata": metadata,
                        ":created_at": flag.created_at().timestamp_millis(),
                    },
                )?;
                Ok(())
            })
            .await
            .wrap_err("adding crisis flag")?;
        Ok(())
    }

    async fn get_crisis_flags(&self, conversation_id: &str) -> Result<Vec<CrisisFlag>> {
        let conversation_id = conversation_id.to_string();
        let flags = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, conversation_id, flag_type, metadata, created_at FROM crisis_flags WHERE conversation_id = ? ORDER BY created_at ASC, rowid ASC",
                )?;
                let mut rows = stmt.query(params![conversation_id])?;

                let mut flags = vec![];
                while let Some(row) = rows.next()? {
                    let id: String = row.get(0)?;
                    let conversation_id: String = row.get(1)?;
                    let flag_type: String = row.get(2)?;
                    let metadata: String = row.get(3)?;
                    let created_at: i64 = row.get(4)?;

                    let metadata = serde_json::from_str(&metadata)
                        .map_err(|e| tokio_rusqlite::Error::Other(e.into()))?;

                    flags.push(
                        CrisisFlag::new(conversation_id, flag_type)
                            .with_id(id)
                            .with_metadata(metadata)
                            .with_created_at(from_millis(created_at)?),
                    );
                }
                Ok(flags)
            })
            .await
            .wrap_err("getting crisis flags")?;
        Ok(flags)
    }
}

fn from_millis(
    millis: i64,
) -> std::result::Result<chrono::DateTime<chrono::Utc>, tokio_rusqlite::Error> {
    chrono::DateTime::from_timestamp_millis(millis).ok_or(tokio_rusqlite::Error::Other(
        eyre::eyre!("invalid timestamp").into(),
    ))
}

fn read_conversation(row: &Row) -> std::result::Result<Conversation, tokio_rusqlite::Error> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let created_at: i64 = row.get(2)?;

    Ok(Conversation::new(user_id)
        .with_id(id)
        .with_created_at(from_millis(created_at)?))
}

fn read_message(row: &Row) -> std::result::Result<Message, tokio_rusqlite::Error> {
    let id: String = row.get(0)?;
    let conversation_id: String = row.get(1)?;
    let sender: String = row.get(2)?;
    let content: String = row.get(3)?;
    let created_at: i64 = row.get(4)?;

    let sender = sender
        .parse::<Sender>()
        .map_err(|e| tokio_rusqlite::Error::Other(e.into()))?;

    Ok(Message::new(conversation_id, sender, content)
        .with_id(id)
        .with_created_at(from_millis(created_at)?))
}
