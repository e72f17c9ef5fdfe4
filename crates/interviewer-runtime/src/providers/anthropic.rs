//! Anthropic Messages API.
//!
//! The key lives in a [`SecretString`] from construction on and is only
//! exposed while building the request headers.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, CompletionConfig, LlmProvider, Prompt, ProviderError};

/// Environment variable read by [`AnthropicProvider::from_env`].
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    api_key: SecretString,
    endpoint: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_key_or_env(None)
    }

    /// An explicit non-blank key wins; otherwise `ANTHROPIC_API_KEY` is read once.
    pub fn from_key_or_env(api_key: Option<&str>) -> Result<Self, ProviderError> {
        let present = |k: &String| !k.trim().is_empty();
        let key = api_key
            .map(str::to_string)
            .filter(present)
            .or_else(|| std::env::var(ANTHROPIC_API_KEY_ENV).ok().filter(present))
            .ok_or_else(|| {
                ProviderError::MissingCredentials(format!(
                    "no Anthropic key given and {} is unset",
                    ANTHROPIC_API_KEY_ENV
                ))
            })?;
        Ok(Self::new(key))
    }

    /// Point at a proxy or a local mock.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserTurn<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> MessagesRequest<'a> {
    fn new(prompt: &'a Prompt, config: &'a CompletionConfig) -> Self {
        Self {
            model: &config.model,
            max_tokens: config.max_tokens,
            system: &prompt.system,
            messages: [UserTurn {
                role: "user",
                content: &prompt.user,
            }],
            temperature: config.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl MessagesResponse {
    fn into_completion(self) -> Result<Completion, ProviderError> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(Completion {
            text,
            model: self.model,
            input_tokens: self.usage.input_tokens,
            output_tokens: self.usage.output_tokens,
        })
    }
}

/// Map a non-success status and its body to an error.
fn status_error(status: StatusCode, retry_after: Option<Duration>, body: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after },
        _ => ProviderError::Rejected {
            status: status.as_u16(),
            message: serde_json::from_str::<ErrorBody>(body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect()),
        },
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, prompt: &Prompt, config: &CompletionConfig) -> Result<Completion, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest::new(prompt, config))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, retry_after, &body));
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| ProviderError::MalformedBody(e.to_string()))?
            .into_completion()
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
