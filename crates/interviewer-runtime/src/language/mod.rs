//! Language service contract.
//!
//! Given a purpose tag and textual context, a language service returns text.
//! For the classification purposes that text is a small JSON verdict, parsed
//! by [`verdict`]; for the generation purposes it is shown to the
//! interviewee as-is.
//!
//! Failures of a language service never leave the adapter.

mod provider_service;
mod scripted;
pub mod verdict;

pub use provider_service::ProviderLanguageService;
pub use scripted::{ScriptedCall, ScriptedLanguageService, ScriptedReply};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::providers::ProviderError;

/// What a language service call is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Translate an answer into the interview language
    Translate,
    /// Flag sensitive, off-topic or reportable content
    DetectConcern,
    /// Judge whether an answer needs probing
    CheckCompleteness,
    /// Short acknowledgement of an answer
    Acknowledge,
    /// A probing follow-up question
    Followup,
    /// Response to a flagged answer
    ConcernResponse,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Translate => "translate",
            Purpose::DetectConcern => "detect_concern",
            Purpose::CheckCompleteness => "check_completeness",
            Purpose::Acknowledge => "acknowledge",
            Purpose::Followup => "followup",
            Purpose::ConcernResponse => "concern_response",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of a language service call.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Circuit open for {0}")]
    CircuitOpen(Purpose),

    #[error("Malformed reply: {0}")]
    Malformed(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// A text-in, text-out language collaborator.
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Answer one request for `purpose` given `context`.
    async fn respond(&self, purpose: Purpose, context: &str) -> Result<String, ServiceError>;

    /// Service name for logs.
    fn name(&self) -> &str;
}
