//! Step handlers.
//!
//! Each handler reads the turn state and returns a [`StepOutput`]: a partial
//! update plus the assistant messages to emit. Handlers never mutate state
//! and never pick the next step; the engine applies the update and asks the
//! router.

mod assessment;
mod intake;
mod storage;

use interviewer_core::{InterviewConfig, Message, Step, TurnState, TurnUpdate};

use crate::adapter::LanguageAdapter;
use crate::engine::EngineError;

/// What one step produced.
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    pub update: TurnUpdate,
    pub messages: Vec<Message>,
}

impl StepOutput {
    pub fn new(update: TurnUpdate) -> Self {
        Self {
            update,
            messages: Vec::new(),
        }
    }

    pub fn say(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::assistant(content));
        self
    }
}

/// Everything a handler may read besides the state.
pub struct StepContext<'a> {
    pub config: &'a InterviewConfig,
    pub adapter: &'a LanguageAdapter,
}

/// Run the handler for `step`.
pub async fn run(step: Step, state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    match step {
        Step::Initialize => intake::initialize(state, ctx),
        Step::Ask => intake::ask(state, ctx),
        Step::Translate => intake::translate(state, ctx).await,
        Step::ValidateFormat => intake::validate_format(state, ctx),
        Step::Reprompt => intake::reprompt(state, ctx),
        Step::StoreBasic => storage::store_basic(state, ctx),
        Step::Analyze => assessment::analyze(state, ctx).await,
        Step::RespondToConcern => assessment::respond_to_concern(state, ctx).await,
        Step::AcknowledgeForFollowup | Step::AcknowledgeForStore => {
            assessment::acknowledge(state, ctx).await
        }
        Step::GenerateFollowup => assessment::generate_followup(state, ctx).await,
        Step::StoreAssessment => storage::store_assessment(state, ctx),
        Step::Finish => storage::finish(state, ctx),
    }
}
