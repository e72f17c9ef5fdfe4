//! Classification and generation adapter.
//!
//! The only place language service calls are made. Every call sits behind
//! its own failure boundary:
//! - offline mode or no service: the call is not issued
//! - circuit open for the purpose: the call is not issued
//! - error, timeout or malformed reply: the failure is recorded
//!
//! In each case the caller gets the safe default (classification) or canned
//! text (generation). Nothing here returns an error.

use std::sync::Arc;
use std::time::Duration;

use interviewer_core::{
    AnswerDraft, Classification, ConcernKind, InterviewKind, Question,
};

use crate::config::RuntimeConfig;
use crate::fallback;
use crate::language::verdict::{self, CompletenessVerdict, ConcernVerdict};
use crate::language::{LanguageService, Purpose, ServiceError};
use crate::prompts;
use crate::resilience::CircuitBreaker;

/// Result of the translate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub was_translated: bool,
}

impl Translation {
    /// Input unchanged, not translated.
    pub fn unchanged(input: &str) -> Self {
        Self {
            text: input.to_string(),
            was_translated: false,
        }
    }
}

/// Wraps a [`LanguageService`] with timeouts, circuit breaking and defaults.
pub struct LanguageAdapter {
    service: Option<Arc<dyn LanguageService>>,
    circuit_breaker: CircuitBreaker,
    call_timeout: Option<Duration>,
    offline: bool,
}

impl LanguageAdapter {
    pub fn new(service: Option<Arc<dyn LanguageService>>, config: &RuntimeConfig, offline: bool) -> Self {
        Self {
            service,
            circuit_breaker: CircuitBreaker::new(config.circuit_breaker.clone()),
            call_timeout: config.call_timeout,
            offline,
        }
    }

    /// An adapter that never calls out.
    pub fn offline() -> Self {
        Self::new(None, &RuntimeConfig::default(), true)
    }

    /// True when no call will ever be issued.
    pub fn is_offline(&self) -> bool {
        self.offline || self.service.is_none()
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Translate an answer. Default: input unchanged, not translated.
    ///
    /// Any case-insensitive difference from the input counts as translated.
    pub async fn translate(&self, answer: &str) -> Translation {
        let context = prompts::translation_context(answer);
        let reply = match self.call(Purpose::Translate, &context).await {
            Some(reply) => reply,
            None => return Translation::unchanged(answer),
        };

        let text = reply.trim();
        if text.is_empty() {
            self.degrade(Purpose::Translate, &ServiceError::Malformed("empty translation".into()));
            return Translation::unchanged(answer);
        }

        Translation {
            text: text.to_string(),
            was_translated: text.to_lowercase() != answer.trim().to_lowercase(),
        }
    }

    /// Concern check. Default: no concern.
    pub async fn detect_concern(&self, kind: &InterviewKind, question: &Question, answer: &str) -> ConcernVerdict {
        let context = prompts::answer_context(kind, question, answer);
        self.classify(Purpose::DetectConcern, &context)
            .await
            .unwrap_or_else(ConcernVerdict::none)
    }

    /// Completeness check over the whole draft. Default: complete.
    pub async fn check_completeness(
        &self,
        kind: &InterviewKind,
        question: &Question,
        draft: &AnswerDraft,
    ) -> CompletenessVerdict {
        let answer = draft.normalized_answer.as_deref().unwrap_or(&draft.raw_answer);
        let context = prompts::exchange_context(kind, question, answer, &draft.followup_exchanges);
        self.classify(Purpose::CheckCompleteness, &context)
            .await
            .unwrap_or_else(CompletenessVerdict::complete)
    }

    /// Run both checks concurrently and join. Either failing degrades alone.
    pub async fn analyze(
        &self,
        kind: &InterviewKind,
        question: &Question,
        latest_answer: &str,
        draft: &AnswerDraft,
    ) -> Classification {
        let (concern, completeness) = tokio::join!(
            self.detect_concern(kind, question, latest_answer),
            self.check_completeness(kind, question, draft),
        );
        verdict::combine(concern, completeness)
    }

    pub async fn acknowledge(&self, kind: &InterviewKind, question: &Question, answer: &str) -> String {
        let context = prompts::answer_context(kind, question, answer);
        self.generate(Purpose::Acknowledge, &context)
            .await
            .unwrap_or_else(|| fallback::acknowledgement(kind))
    }

    pub async fn followup(&self, kind: &InterviewKind, question: &Question, draft: &AnswerDraft) -> String {
        let answer = draft.normalized_answer.as_deref().unwrap_or(&draft.raw_answer);
        let context = prompts::exchange_context(kind, question, answer, &draft.followup_exchanges);
        self.generate(Purpose::Followup, &context)
            .await
            .unwrap_or_else(|| fallback::followup(kind))
    }

    pub async fn concern_response(
        &self,
        kind: &InterviewKind,
        question: &Question,
        answer: &str,
        concern: Option<ConcernKind>,
    ) -> String {
        let context = prompts::answer_context(kind, question, answer);
        self.generate(Purpose::ConcernResponse, &context)
            .await
            .unwrap_or_else(|| fallback::concern_response(kind, concern))
    }

    async fn classify<T: serde::de::DeserializeOwned>(&self, purpose: Purpose, context: &str) -> Option<T> {
        let reply = self.call(purpose, context).await?;
        match verdict::parse(&reply) {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                self.degrade(purpose, &e);
                None
            }
        }
    }

    async fn generate(&self, purpose: Purpose, context: &str) -> Option<String> {
        let reply = self.call(purpose, context).await?;
        let text = reply.trim();
        if text.is_empty() {
            self.degrade(purpose, &ServiceError::Malformed("empty reply".into()));
            return None;
        }
        Some(text.to_string())
    }

    /// Issue one call, or `None` when offline or the call failed.
    async fn call(&self, purpose: Purpose, context: &str) -> Option<String> {
        if self.offline {
            return None;
        }
        let service = self.service.as_ref()?;

        match self.guarded_call(service.as_ref(), purpose, context).await {
            Ok(reply) => Some(reply),
            Err(ServiceError::CircuitOpen(_)) => {
                tracing::warn!(purpose = %purpose, "Circuit open, using default");
                None
            }
            Err(e) => {
                tracing::warn!(purpose = %purpose, service = service.name(), error = %e, "Language service call failed, using default");
                None
            }
        }
    }

    /// The call behind the circuit breaker and timeout. Records the outcome.
    async fn guarded_call(
        &self,
        service: &dyn LanguageService,
        purpose: Purpose,
        context: &str,
    ) -> Result<String, ServiceError> {
        if self.circuit_breaker.is_open(purpose) {
            return Err(ServiceError::CircuitOpen(purpose));
        }

        let result = match self.call_timeout {
            Some(timeout) => tokio::time::timeout(timeout, service.respond(purpose, context))
                .await
                .unwrap_or(Err(ServiceError::Timeout(timeout))),
            None => service.respond(purpose, context).await,
        };

        match &result {
            Ok(_) => self.circuit_breaker.record_success(purpose),
            Err(_) => self.circuit_breaker.record_failure(purpose),
        }
        result
    }

    /// A reply arrived but was unusable.
    fn degrade(&self, purpose: Purpose, error: &ServiceError) {
        self.circuit_breaker.record_failure(purpose);
        tracing::warn!(purpose = %purpose, error = %error, "Unusable language service reply, using default");
    }
}
