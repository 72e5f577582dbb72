use std::sync::Arc;

use crate::core::error::StorageError;
use crate::core::message::Message;
use crate::storage::MessageStore;

/// Ordered message list for the session open in the UI. Appends re-persist
/// the full sequence; an append addressed to a session that is not open is
/// written straight through to the store without disturbing the open view.
pub struct MessageLog {
    store: Arc<dyn MessageStore>,
    open_session: Option<String>,
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store,
            open_session: None,
            messages: Vec::new(),
        }
    }

    /// Load a session's messages and make it the open one.
    pub async fn open(&mut self, session_id: &str) -> &[Message] {
        self.messages = self.store.load(session_id).await;
        self.open_session = Some(session_id.to_string());
        &self.messages
    }

    pub fn close(&mut self) {
        self.open_session = None;
        self.messages.clear();
    }

    pub fn open_session(&self) -> Option<&str> {
        self.open_session.as_deref()
    }

    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    /// Append to the message's own session. The in-memory view is updated
    /// first, so a failed persist leaves the message visible; last
    /// successful persist wins.
    pub async fn append(&mut self, message: Message) -> Result<(), StorageError> {
        let session_id = message.session_id.clone();
        if self.open_session.as_deref() == Some(session_id.as_str()) {
            self.messages.push(message);
            self.store.save(&session_id, &self.messages).await
        } else {
            let mut stored = self.store.load(&session_id).await;
            stored.push(message);
            self.store.save(&session_id, &stored).await
        }
    }
}
