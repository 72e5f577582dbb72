use std::sync::Arc;

use crate::core::error::StorageError;
use crate::core::session::{sort_by_recency, Session};
use crate::storage::SessionStore;

/// In-memory session list for one user, kept in recency order and written
/// through to the store on every mutation. Owns the current-session
/// selection; at most one session is current.
pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
    user_id: String,
    sessions: Vec<Session>,
    current: Option<String>,
    recent_limit: usize,
}

impl SessionRegistry {
    pub async fn load(store: Arc<dyn SessionStore>, user_id: String, recent_limit: usize) -> Self {
        let mut sessions = store.load(&user_id).await;
        sort_by_recency(&mut sessions);
        Self {
            store,
            user_id,
            sessions,
            current: None,
            recent_limit,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Recent sessions, newest first, bounded to the sidebar cap. Older
    /// sessions stay persisted, they just fall off the view.
    pub fn list(&self) -> &[Session] {
        let n = self.sessions.len().min(self.recent_limit);
        &self.sessions[..n]
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    pub fn set_current(&mut self, session_id: Option<&str>) -> Result<(), StorageError> {
        match session_id {
            Some(id) => {
                if self.get(id).is_none() {
                    return Err(StorageError::NotFound(format!("session {id}")));
                }
                self.current = Some(id.to_string());
            }
            None => self.current = None,
        }
        Ok(())
    }

    /// New session prepended to the list, persisted, and marked current.
    pub async fn create(&mut self, title: &str) -> Result<Session, StorageError> {
        let session = Session::new(self.user_id.clone(), title.to_string());
        self.sessions.insert(0, session.clone());
        self.store.save(&self.user_id, &self.sessions).await?;
        self.current = Some(session.id.clone());
        Ok(session)
    }

    /// Bump `updated_at` for a session and restore recency order, both in
    /// memory and in the store.
    pub async fn touch(&mut self, session_id: &str) -> Result<(), StorageError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| StorageError::NotFound(format!("session {session_id}")))?;
        session.touch();
        sort_by_recency(&mut self.sessions);
        self.store.save(&self.user_id, &self.sessions).await
    }
}
