use std::time::Duration;

use async_trait::async_trait;

use crate::core::error::ProviderError;
use crate::core::message::Message;
use crate::core::model::Model;
use crate::core::provider::CompletionProvider;

/// Placeholder provider: sleeps a fixed delay to simulate network latency,
/// then returns a canned reply naming the selected model. Stands in until
/// the OpenRouter-backed provider exists.
pub struct SimulatedProvider {
    delay: Duration,
}

impl SimulatedProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CompletionProvider for SimulatedProvider {
    async fn generate(&self, model: &Model, _history: &[Message]) -> Result<String, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(format!(
            "This is a simulated response from {}. In a production environment, \
             this would call the OpenRouter API to generate a real response \
             based on your prompt.",
            model.display_name
        ))
    }
}
