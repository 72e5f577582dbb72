use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::model::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn in a session. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<ModelId>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new_user(session_id: String, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            role: MessageRole::User,
            content,
            model_used: None,
            created_at: Utc::now(),
        }
    }

    pub fn new_assistant(session_id: String, content: String, model: ModelId) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            role: MessageRole::Assistant,
            content,
            model_used: Some(model),
            created_at: Utc::now(),
        }
    }
}
