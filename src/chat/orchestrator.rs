use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error};

use crate::chat::event::ChatEvent;
use crate::chat::log::MessageLog;
use crate::chat::registry::SessionRegistry;
use crate::core::error::ArceusError;
use crate::core::message::Message;
use crate::core::model::Model;
use crate::core::provider::CompletionProvider;
use crate::core::session::Session;

struct PendingReply {
    token: CancellationToken,
    in_flight: usize,
}

/// Drives the send/reply exchange: validates input, appends the user
/// message, asks the completion provider for a reply and delivers it to the
/// originating session's log, then touches the session's recency timestamp.
///
/// Each pending reply runs as a tracked task holding a cancellation token
/// keyed by session id; switching the current session cancels the previous
/// session's pending replies instead of letting them land in a background
/// log.
pub struct ChatOrchestrator {
    registry: Arc<Mutex<SessionRegistry>>,
    log: Arc<Mutex<MessageLog>>,
    provider: Arc<dyn CompletionProvider>,
    selected_model: Mutex<Model>,
    pending: Arc<StdMutex<HashMap<String, PendingReply>>>,
    tasks: TaskTracker,
}

impl ChatOrchestrator {
    pub fn new(
        registry: SessionRegistry,
        log: MessageLog,
        provider: Arc<dyn CompletionProvider>,
        model: Model,
    ) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            log: Arc::new(Mutex::new(log)),
            provider,
            selected_model: Mutex::new(model),
            pending: Arc::new(StdMutex::new(HashMap::new())),
            tasks: TaskTracker::new(),
        }
    }

    pub async fn model(&self) -> Model {
        self.selected_model.lock().await.clone()
    }

    pub async fn set_model(&self, model: Model) {
        *self.selected_model.lock().await = model;
    }

    /// Recent sessions, newest first.
    pub async fn sessions(&self) -> Vec<Session> {
        self.registry.lock().await.list().to_vec()
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.registry.lock().await.current().cloned()
    }

    /// Messages of the open session.
    pub async fn messages(&self) -> Vec<Message> {
        self.log.lock().await.list().to_vec()
    }

    /// True while a reply for the session is scheduled but not delivered.
    pub fn is_pending(&self, session_id: &str) -> bool {
        self.pending.lock().unwrap().contains_key(session_id)
    }

    /// Create a session, make it current, and open its (empty) log.
    /// Switching away cancels the previous session's pending replies.
    pub async fn new_chat(&self, title: &str) -> Result<Session, ArceusError> {
        let mut registry = self.registry.lock().await;
        let previous = registry.current().map(|s| s.id.clone());
        let session = registry.create(title).await?;
        drop(registry);

        if let Some(prev) = previous {
            self.cancel_pending(&prev);
        }
        self.log.lock().await.open(&session.id).await;
        Ok(session)
    }

    /// Make an existing session current and load its messages. Cancels the
    /// previously current session's pending replies.
    pub async fn select_session(&self, session_id: &str) -> Result<(), ArceusError> {
        let mut registry = self.registry.lock().await;
        let previous = registry.current().map(|s| s.id.clone());
        registry
            .set_current(Some(session_id))
            .map_err(|_| ArceusError::SessionNotFound(session_id.to_string()))?;
        drop(registry);

        if let Some(prev) = previous {
            if prev != session_id {
                self.cancel_pending(&prev);
            }
        }
        self.log.lock().await.open(session_id).await;
        Ok(())
    }

    /// Cancel any scheduled replies for the session.
    pub fn cancel_pending(&self, session_id: &str) {
        if let Some(entry) = self.pending.lock().unwrap().remove(session_id) {
            entry.token.cancel();
        }
    }

    /// Append a user message and schedule the assistant reply. Empty or
    /// whitespace-only input, or the absence of a current session, is a
    /// silent no-op (`None`). Persistence failures are logged and the
    /// in-memory transcript is not rolled back.
    pub async fn send(&self, text: &str) -> Option<mpsc::Receiver<ChatEvent>> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring empty input");
            return None;
        }

        let session_id = match self.registry.lock().await.current() {
            Some(session) => session.id.clone(),
            None => {
                debug!("ignoring send without a current session");
                return None;
            }
        };

        let user_message = Message::new_user(session_id.clone(), text.to_string());
        let history = {
            let mut log = self.log.lock().await;
            if let Err(e) = log.append(user_message).await {
                error!(%session_id, error = %e, "failed to persist user message");
            }
            log.list().to_vec()
        };

        let model = self.selected_model.lock().await.clone();
        let token = self.register_pending(&session_id);

        let (tx, rx) = mpsc::channel(8);
        let _ = tx.try_send(ChatEvent::Started {
            session_id: session_id.clone(),
        });

        let provider = Arc::clone(&self.provider);
        let log = Arc::clone(&self.log);
        let registry = Arc::clone(&self.registry);
        let pending = Arc::clone(&self.pending);

        self.tasks.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    // cancel_pending already dropped the pending entry
                    debug!(%session_id, "pending reply cancelled");
                    let _ = tx
                        .send(ChatEvent::Cancelled {
                            session_id: session_id.clone(),
                        })
                        .await;
                }
                result = provider.generate(&model, &history) => {
                    let event = match result {
                        Ok(content) => {
                            let reply = Message::new_assistant(
                                session_id.clone(),
                                content,
                                model.id.clone(),
                            );
                            {
                                let mut log = log.lock().await;
                                if let Err(e) = log.append(reply.clone()).await {
                                    error!(%session_id, error = %e, "failed to persist reply");
                                }
                            }
                            {
                                let mut registry = registry.lock().await;
                                if let Err(e) = registry.touch(&session_id).await {
                                    error!(%session_id, error = %e, "failed to touch session");
                                }
                            }
                            ChatEvent::Reply { message: reply }
                        }
                        Err(e) => {
                            error!(%session_id, error = %e, "completion failed");
                            ChatEvent::Error {
                                error: e.to_string(),
                            }
                        }
                    };
                    finish_pending(&pending, &session_id);
                    let _ = tx.send(event).await;
                }
            }
        });

        Some(rx)
    }

    fn register_pending(&self, session_id: &str) -> CancellationToken {
        let mut pending = self.pending.lock().unwrap();
        let entry = pending
            .entry(session_id.to_string())
            .or_insert_with(|| PendingReply {
                token: CancellationToken::new(),
                in_flight: 0,
            });
        entry.in_flight += 1;
        entry.token.clone()
    }
}

fn finish_pending(pending: &StdMutex<HashMap<String, PendingReply>>, session_id: &str) {
    let mut pending = pending.lock().unwrap();
    if let Some(entry) = pending.get_mut(session_id) {
        entry.in_flight -= 1;
        if entry.in_flight == 0 {
            pending.remove(session_id);
        }
    }
}
