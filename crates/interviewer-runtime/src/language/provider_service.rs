//! Language service backed by an [`LlmProvider`].

use async_trait::async_trait;
use std::sync::Arc;

use super::{LanguageService, Purpose, ServiceError};
use crate::prompts;
use crate::providers::{CompletionConfig, LlmProvider, Prompt};

/// Sends each request as a system prompt for the purpose plus the context
/// as the user turn.
pub struct ProviderLanguageService {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl ProviderLanguageService {
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion,
        }
    }
}

#[async_trait]
impl LanguageService for ProviderLanguageService {
    async fn respond(&self, purpose: Purpose, context: &str) -> Result<String, ServiceError> {
        let prompt = Prompt::new(prompts::system_prompt(purpose), context);
        let completion = self.provider.complete(&prompt, &self.completion).await?;

        tracing::debug!(
            provider = self.provider.name(),
            purpose = %purpose,
            model = %completion.model,
            tokens = completion.tokens(),
            "Language service call completed"
        );

        Ok(completion.text)
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}
