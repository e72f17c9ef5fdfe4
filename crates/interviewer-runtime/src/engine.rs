//! Interview engine: drives one turn at a time.
//!
//! A turn starts at the entry route and repeats step → route until the
//! router says to wait for the user or the interview is over. The caller
//! persists the returned state and must not run two turns of the same
//! interview concurrently.

use std::sync::Arc;
use thiserror::Error;

use interviewer_core::{
    route_after, route_entry, ConfigError, FinalTranscript, InterviewConfig, Message,
    StateInvariantError, Step, Transition, TurnState,
};

use crate::adapter::LanguageAdapter;
use crate::config::RuntimeConfig;
use crate::language::LanguageService;
use crate::steps::{self, StepContext};

/// Errors that end a turn. Both are fatal for the interview.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("State invariant violated: {0}")]
    StateInvariant(#[from] StateInvariantError),
}

/// Where the interview stands after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    AwaitingInput,
    Finished,
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// State to persist for the next turn
    pub state: TurnState,

    /// Assistant messages emitted this turn, in order
    pub messages: Vec<Message>,

    pub status: TurnStatus,
}

impl TurnOutcome {
    pub fn is_finished(&self) -> bool {
        self.status == TurnStatus::Finished
    }

    /// Set only on the turn that finished the interview and after.
    pub fn transcript(&self) -> Option<&FinalTranscript> {
        self.state.final_transcript.as_ref()
    }
}

/// Runs interviews for one configuration.
pub struct InterviewEngine {
    config: InterviewConfig,
    adapter: LanguageAdapter,
}

impl InterviewEngine {
    /// Create an engine. Without a service the engine behaves as offline.
    pub fn new(
        config: InterviewConfig,
        service: Option<Arc<dyn LanguageService>>,
        runtime: RuntimeConfig,
    ) -> Self {
        if service.is_none() && !config.offline_mode {
            tracing::warn!("No language service configured, using canned text and default verdicts");
        }
        let adapter = LanguageAdapter::new(service, &runtime, config.offline_mode);
        Self { config, adapter }
    }

    pub fn builder(config: InterviewConfig) -> InterviewEngineBuilder {
        InterviewEngineBuilder::new(config)
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    pub fn adapter(&self) -> &LanguageAdapter {
        &self.adapter
    }

    /// Start a new interview: greet and ask the first question.
    pub async fn start(&self) -> Result<TurnOutcome, EngineError> {
        self.run_turn(TurnState::new()).await
    }

    /// Record a user message and run the turn it triggers.
    pub async fn handle_message(
        &self,
        mut state: TurnState,
        content: impl Into<String>,
    ) -> Result<TurnOutcome, EngineError> {
        if state.is_finished {
            return Err(StateInvariantError::AlreadyFinished.into());
        }
        state.append_messages([Message::user(content)]);
        self.run_turn(state).await
    }

    /// Run one turn from whatever the state holds.
    ///
    /// On error the returned state is dropped; the caller's persisted copy
    /// is still the last good state.
    pub async fn run_turn(&self, mut state: TurnState) -> Result<TurnOutcome, EngineError> {
        let catalog = &self.config.questions;
        let ctx = StepContext {
            config: &self.config,
            adapter: &self.adapter,
        };

        let mut step = route_entry(&state)?;
        let mut messages = Vec::new();

        let status = loop {
            tracing::debug!(
                step = %step,
                question_index = state.current_question_index,
                followups = state.current_followup_count,
                "Running step"
            );

            let output = steps::run(step, &state, &ctx).await?;
            state.apply(output.update, catalog)?;
            state.append_messages(output.messages.iter().cloned());
            messages.extend(output.messages);

            match route_after(step, &state, catalog)? {
                Transition::Run(next) => step = next,
                Transition::WaitForUser => break TurnStatus::AwaitingInput,
                Transition::Terminal => break TurnStatus::Finished,
            }
        };

        Ok(TurnOutcome {
            state,
            messages,
            status,
        })
    }

    /// The step a turn would start with, for hosts that log or display it.
    pub fn entry_step(&self, state: &TurnState) -> Result<Step, EngineError> {
        Ok(route_entry(state)?)
    }
}

/// Builder for [`InterviewEngine`].
pub struct InterviewEngineBuilder {
    config: InterviewConfig,
    service: Option<Arc<dyn LanguageService>>,
    runtime: RuntimeConfig,
}

impl InterviewEngineBuilder {
    pub fn new(config: InterviewConfig) -> Self {
        Self {
            config,
            service: None,
            runtime: RuntimeConfig::default(),
        }
    }

    /// Set the language service.
    pub fn service(mut self, service: Arc<dyn LanguageService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Set the runtime configuration.
    pub fn runtime_config(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    /// Override the config's offline flag.
    pub fn offline(mut self, offline: bool) -> Self {
        self.config.offline_mode = offline;
        self
    }

    pub fn build(self) -> InterviewEngine {
        InterviewEngine::new(self.config, self.service, self.runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interviewer_core::{InterviewKind, Question, QuestionKind};

    fn engine() -> InterviewEngine {
        InterviewEngine::builder(InterviewConfig::new(
            InterviewKind::Screener,
            vec![Question::new(QuestionKind::YesNo, "Can you start next month?")],
        ))
        .offline(true)
        .build()
    }

    #[tokio::test]
    async fn test_start_greets_and_asks() {
        let outcome = engine().start().await.unwrap();

        assert_eq!(outcome.status, TurnStatus::AwaitingInput);
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.messages[1].content, "Can you start next month?");
        assert!(outcome.state.started_at.is_some());
        assert_eq!(outcome.state.message_log.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_asking() {
        let engine = InterviewEngine::builder(InterviewConfig::new(InterviewKind::Exit, vec![]))
            .offline(true)
            .build();
        let err = engine.start().await.unwrap_err();
        assert!(matches!(err, EngineError::Configuration(ConfigError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_finished_state_is_not_reentered() {
        let engine = engine();
        let started = engine.start().await.unwrap();
        let finished = engine.handle_message(started.state, "yes").await.unwrap();
        assert!(finished.is_finished());

        let err = engine.handle_message(finished.state.clone(), "hello?").await.unwrap_err();
        assert!(matches!(err, EngineError::StateInvariant(StateInvariantError::AlreadyFinished)));

        let err = engine.run_turn(finished.state).await.unwrap_err();
        assert!(matches!(err, EngineError::StateInvariant(StateInvariantError::AlreadyFinished)));
    }

    #[tokio::test]
    async fn test_entry_without_pending_message_regreets() {
        let engine = engine();
        let started = engine.start().await.unwrap();
        assert_eq!(engine.entry_step(&started.state).unwrap(), Step::Initialize);

        let again = engine.run_turn(started.state.clone()).await.unwrap();
        assert_eq!(again.state.started_at, started.state.started_at);
        assert_eq!(again.state.current_question_index, 0);
    }
}
