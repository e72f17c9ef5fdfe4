//! LLM providers.
//!
//! Interview calls are single-shot: one system prompt for the purpose and
//! one user turn carrying the context. A provider turns that [`Prompt`] into
//! a [`Completion`] and nothing more; timeouts, circuit breaking and
//! fallbacks belong to [`crate::adapter`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "anthropic")]
mod anthropic;

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicProvider, ANTHROPIC_API_KEY_ENV};

/// Transport-level failures of a provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request could not be sent: {0}")]
    Transport(String),

    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Credentials were rejected")]
    Unauthorized,

    #[error("Unreadable response body: {0}")]
    MalformedBody(String),

    #[error("Completion contained no text")]
    EmptyCompletion,

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Model settings shared by every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,

    /// Replies are one or two sentences or a small JSON object
    pub max_tokens: u32,

    pub temperature: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250514".to_string(),
            max_tokens: 300,
            temperature: 0.0,
        }
    }
}

/// One request: system instructions plus a single user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Text produced for a [`Prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Completion {
    pub fn tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, prompt: &Prompt, config: &CompletionConfig) -> Result<Completion, ProviderError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}
