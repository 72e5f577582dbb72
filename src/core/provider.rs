use async_trait::async_trait;

use crate::core::error::ProviderError;
use crate::core::message::Message;
use crate::core::model::Model;

/// Produces the assistant's reply for one exchange. The in-tree
/// implementation simulates latency and returns a canned string; a real
/// gateway client slots in behind the same trait.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(&self, model: &Model, history: &[Message]) -> Result<String, ProviderError>;
}
