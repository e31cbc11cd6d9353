// ============================
// chatterd-backend-lib/src/chat/store.rs
// ============================
//! Conversation and message persistence with a flat-file implementation.
//!
//! The identity core only hands these operations a user id; no invariants
//! beyond ownership checks live here.
use crate::chat::gateway::ChatMessage;
use crate::error::AppError;
use async_trait::async_trait;
use chatterd_common::{AccountId, ChatRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Conversation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: AccountId,
    /// Derived from the first user message once one exists
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One persisted chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Trait for conversation storage backends
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create an empty conversation owned by `user_id`.
    async fn create(&self, user_id: AccountId) -> Result<Uuid, AppError>;

    /// Load a conversation only if it belongs to `user_id`.
    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: AccountId,
    ) -> Result<Option<Conversation>, AppError>;

    /// Most recently created conversation for the user, if any.
    async fn latest_for_user(&self, user_id: AccountId) -> Result<Option<Uuid>, AppError>;

    /// Set the conversation title.
    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), AppError>;

    /// Append one message. Empty content is rejected.
    async fn append_message(
        &self,
        id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<(), AppError>;

    /// All messages in insertion order, for display.
    async fn messages(&self, id: Uuid) -> Result<Vec<StoredMessage>, AppError>;

    /// The most recent `limit` messages in chronological order, shaped for
    /// the completion gateway.
    async fn history_for_model(
        &self,
        id: Uuid,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, AppError>;

    /// First message sent by the user, the title source.
    async fn first_user_message(&self, id: Uuid) -> Result<Option<String>, AppError>;
}

/// Flat-file implementation: one directory per conversation holding a
/// `conversation.json` meta file and a `messages.log` JSONL append log.
#[derive(Clone)]
pub struct FlatFileChatStore {
    root: PathBuf,
}

impl FlatFileChatStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().join("conversations");
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn meta_path(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string()).join("conversation.json")
    }

    fn log_path(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string()).join("messages.log")
    }

    async fn load_meta(&self, id: Uuid) -> Result<Option<Conversation>, AppError> {
        let path = self.meta_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio_fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn store_meta(&self, conversation: &Conversation) -> Result<(), AppError> {
        let path = self.meta_path(conversation.id);
        if let Some(parent) = path.parent() {
            tokio_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(conversation)?;
        tokio_fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for FlatFileChatStore {
    async fn create(&self, user_id: AccountId) -> Result<Uuid, AppError> {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_id,
            title: None,
            created_at: Utc::now(),
        };
        self.store_meta(&conversation).await?;
        Ok(conversation.id)
    }

    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: AccountId,
    ) -> Result<Option<Conversation>, AppError> {
        Ok(self
            .load_meta(id)
            .await?
            .filter(|conversation| conversation.user_id == user_id))
    }

    async fn latest_for_user(&self, user_id: AccountId) -> Result<Option<Uuid>, AppError> {
        let mut latest: Option<Conversation> = None;
        let mut entries = tokio_fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Ok(id) = Uuid::parse_str(&entry.file_name().to_string_lossy()) else {
                continue;
            };
            if let Some(conversation) = self.load_meta(id).await? {
                if conversation.user_id == user_id
                    && latest
                        .as_ref()
                        .is_none_or(|seen| conversation.created_at > seen.created_at)
                {
                    latest = Some(conversation);
                }
            }
        }
        Ok(latest.map(|conversation| conversation.id))
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), AppError> {
        let mut conversation = self
            .load_meta(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;
        conversation.title = Some(title.to_string());
        self.store_meta(&conversation).await
    }

    async fn append_message(
        &self,
        id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<(), AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(vec![
                "Message content cannot be empty".to_string(),
            ]));
        }

        let message = StoredMessage {
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');

        let path = self.log_path(id);
        if let Some(parent) = path.parent() {
            tokio_fs::create_dir_all(parent).await?;
        }
        let mut file = tokio_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn messages(&self, id: Uuid) -> Result<Vec<StoredMessage>, AppError> {
        let path = self.log_path(id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio_fs::read_to_string(&path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AppError::from))
            .collect()
    }

    async fn history_for_model(
        &self,
        id: Uuid,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let messages = self.messages(id).await?;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages
            .into_iter()
            .skip(skip)
            .map(|message| ChatMessage {
                role: message.role,
                content: message.content,
            })
            .collect())
    }

    async fn first_user_message(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let messages = self.messages(id).await?;
        Ok(messages
            .into_iter()
            .find(|message| message.role == ChatRole::User)
            .map(|message| message.content))
    }
}
