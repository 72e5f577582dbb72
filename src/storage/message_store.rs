use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::core::error::StorageError;
use crate::core::message::Message;
use crate::storage::keys;
use crate::storage::kv::KvStore;

/// Persistence for one session's message sequence, written whole on every
/// append. Last successful write wins.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Stored messages for a session in `created_at` ascending order.
    /// Missing or corrupt data yields an empty list, never an error.
    async fn load(&self, session_id: &str) -> Vec<Message>;

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), StorageError>;
}

pub struct KvMessageStore {
    kv: Arc<dyn KvStore>,
}

impl KvMessageStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl MessageStore for KvMessageStore {
    async fn load(&self, session_id: &str) -> Vec<Message> {
        let key = keys::message_list_key(session_id);
        let raw = match self.kv.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(%key, error = %e, "failed to read message list, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(%key, error = %e, "corrupt message list, treating as empty");
                Vec::new()
            }
        }
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(messages)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(&keys::message_list_key(session_id), &raw).await
    }
}
