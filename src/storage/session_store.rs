use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::core::error::StorageError;
use crate::core::session::Session;
use crate::storage::keys;
use crate::storage::kv::KvStore;

/// Persistence for a user's full session list. The list is written whole on
/// every mutation; there is no per-row update.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// All stored sessions for the user. Missing or corrupt data yields an
    /// empty list, never an error.
    async fn load(&self, user_id: &str) -> Vec<Session>;

    async fn save(&self, user_id: &str, sessions: &[Session]) -> Result<(), StorageError>;
}

pub struct KvSessionStore {
    kv: Arc<dyn KvStore>,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl SessionStore for KvSessionStore {
    async fn load(&self, user_id: &str) -> Vec<Session> {
        let key = keys::session_list_key(user_id);
        let raw = match self.kv.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(%key, error = %e, "failed to read session list, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(%key, error = %e, "corrupt session list, treating as empty");
                Vec::new()
            }
        }
    }

    async fn save(&self, user_id: &str, sessions: &[Session]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(sessions)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(&keys::session_list_key(user_id), &raw).await
    }
}
