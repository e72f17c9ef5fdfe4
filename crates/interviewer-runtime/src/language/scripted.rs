//! Scripted language service for tests and offline demos.
//!
//! Replies are queued per purpose and consumed in order. Errors can be
//! injected, latency simulated, and every call is recorded.
//!
//! ```ignore
//! let service = ScriptedLanguageService::new()
//!     .with_reply(Purpose::CheckCompleteness, r#"{"is_complete_answer": false}"#)
//!     .with_error(Purpose::DetectConcern, "upstream unavailable");
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use super::{LanguageService, Purpose, ServiceError};

/// One queued reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Text(String),
    Error(String),
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCall {
    pub purpose: Purpose,
    pub context: String,
}

/// Language service that plays back scripted replies.
///
/// Cloning shares the queues and the call log, so a test can keep a handle
/// after handing the service to an engine.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLanguageService {
    queues: Arc<Mutex<HashMap<Purpose, VecDeque<ScriptedReply>>>>,
    fallbacks: Arc<Mutex<HashMap<Purpose, String>>>,
    calls: Arc<Mutex<Vec<ScriptedCall>>>,
    delay: Duration,
}

impl ScriptedLanguageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply for `purpose`.
    pub fn with_reply(self, purpose: Purpose, reply: impl Into<String>) -> Self {
        self.push(purpose, ScriptedReply::Text(reply.into()));
        self
    }

    /// Queue a failure for `purpose`.
    pub fn with_error(self, purpose: Purpose, message: impl Into<String>) -> Self {
        self.push(purpose, ScriptedReply::Error(message.into()));
        self
    }

    /// Reply used for `purpose` once its queue is empty.
    pub fn with_fallback_reply(self, purpose: Purpose, reply: impl Into<String>) -> Self {
        self.fallbacks.lock().insert(purpose, reply.into());
        self
    }

    /// Simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a reply on a shared handle.
    pub fn push(&self, purpose: Purpose, reply: ScriptedReply) {
        self.queues.lock().entry(purpose).or_default().push_back(reply);
    }

    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, purpose: Purpose) -> usize {
        self.calls.lock().iter().filter(|c| c.purpose == purpose).count()
    }

    /// Replies still queued for `purpose`.
    pub fn remaining(&self, purpose: Purpose) -> usize {
        self.queues.lock().get(&purpose).map_or(0, VecDeque::len)
    }

    fn next_reply(&self, purpose: Purpose) -> Option<ScriptedReply> {
        if let Some(reply) = self.queues.lock().get_mut(&purpose).and_then(VecDeque::pop_front) {
            return Some(reply);
        }
        self.fallbacks.lock().get(&purpose).cloned().map(ScriptedReply::Text)
    }
}

#[async_trait]
impl LanguageService for ScriptedLanguageService {
    async fn respond(&self, purpose: Purpose, context: &str) -> Result<String, ServiceError> {
        self.calls.lock().push(ScriptedCall {
            purpose,
            context: context.to_string(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.next_reply(purpose) {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Error(message)) => Err(ServiceError::Unavailable(message)),
            None => Err(ServiceError::Unavailable(format!("no scripted reply for {}", purpose))),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_consumed_in_order() {
        let service = ScriptedLanguageService::new()
            .with_reply(Purpose::Acknowledge, "first")
            .with_reply(Purpose::Acknowledge, "second");

        assert_eq!(service.respond(Purpose::Acknowledge, "").await.unwrap(), "first");
        assert_eq!(service.respond(Purpose::Acknowledge, "").await.unwrap(), "second");
        assert!(service.respond(Purpose::Acknowledge, "").await.is_err());
    }

    #[tokio::test]
    async fn test_queues_are_per_purpose() {
        let service = ScriptedLanguageService::new().with_reply(Purpose::Translate, "hello");
        assert!(service.respond(Purpose::Followup, "").await.is_err());
        assert_eq!(service.remaining(Purpose::Translate), 1);
    }

    #[tokio::test]
    async fn test_error_injection_and_fallback() {
        let service = ScriptedLanguageService::new()
            .with_error(Purpose::DetectConcern, "boom")
            .with_fallback_reply(Purpose::DetectConcern, r#"{"has_concern": false}"#);

        let err = service.respond(Purpose::DetectConcern, "").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(ref m) if m == "boom"));
        assert!(service.respond(Purpose::DetectConcern, "").await.is_ok());
        assert!(service.respond(Purpose::DetectConcern, "").await.is_ok());
    }

    #[tokio::test]
    async fn test_calls_recorded_on_shared_handle() {
        let service = ScriptedLanguageService::new().with_reply(Purpose::Followup, "Why?");
        let handle = service.clone();

        service.respond(Purpose::Followup, "context").await.unwrap();
        assert_eq!(handle.call_count(), 1);
        assert_eq!(handle.calls()[0].context, "context");
        assert_eq!(handle.calls_for(Purpose::Followup), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_simulated() {
        let service = ScriptedLanguageService::new()
            .with_reply(Purpose::Translate, "hi")
            .with_delay(Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        service.respond(Purpose::Translate, "hola").await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
