//! Router: maps a post-step turn state to the next step.
//!
//! The routing rules are fixed and their precedence is the policy:
//! 1. A reprompt dominates any further processing of the current answer
//! 2. A concern dominates completeness and follow-up eligibility
//! 3. A complete answer, or an exhausted follow-up budget, goes to storage
//! 4. Otherwise a follow-up is generated
//!
//! Routing is a pure function of `(step, state, catalog)`; it never
//! mutates the state and never calls out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Question;
use crate::state::{StateInvariantError, TurnState};

/// A unit of work in the turn cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Initialize,
    Ask,
    Translate,
    ValidateFormat,
    Reprompt,
    StoreBasic,
    Analyze,
    RespondToConcern,
    AcknowledgeForFollowup,
    AcknowledgeForStore,
    GenerateFollowup,
    StoreAssessment,
    Finish,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Initialize => "initialize",
            Step::Ask => "ask",
            Step::Translate => "translate",
            Step::ValidateFormat => "validate_format",
            Step::Reprompt => "reprompt",
            Step::StoreBasic => "store_basic",
            Step::Analyze => "analyze",
            Step::RespondToConcern => "respond_to_concern",
            Step::AcknowledgeForFollowup => "acknowledge_for_followup",
            Step::AcknowledgeForStore => "acknowledge_for_store",
            Step::GenerateFollowup => "generate_followup",
            Step::StoreAssessment => "store_assessment",
            Step::Finish => "finish",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens after a step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "step", rename_all = "snake_case")]
pub enum Transition {
    /// Run another step within this turn
    Run(Step),
    /// Stop and wait for the next user message
    WaitForUser,
    /// The interview is over
    Terminal,
}

/// Pick the first step of a turn.
pub fn route_entry(state: &TurnState) -> Result<Step, StateInvariantError> {
    if state.is_finished {
        return Err(StateInvariantError::AlreadyFinished);
    }

    if state.started_at.is_none() {
        return Ok(Step::Initialize);
    }

    if state.pending_user_message().is_some() {
        return Ok(Step::Translate);
    }

    // Started but nothing new to process: greet and ask again.
    Ok(Step::Initialize)
}

/// Pick the transition that follows `step`, given the state it produced.
pub fn route_after(
    step: Step,
    state: &TurnState,
    catalog: &[Question],
) -> Result<Transition, StateInvariantError> {
    let transition = match step {
        Step::Initialize => Transition::Run(Step::Ask),
        Step::Ask => Transition::WaitForUser,
        Step::Translate => Transition::Run(Step::ValidateFormat),
        Step::ValidateFormat => {
            if state.needs_reprompt {
                Transition::Run(Step::Reprompt)
            } else {
                Transition::Run(classify_by_kind(state, catalog)?)
            }
        }
        Step::Reprompt => Transition::WaitForUser,
        Step::Analyze => Transition::Run(route_after_analysis(state, catalog)?),
        Step::RespondToConcern => Transition::Run(Step::StoreAssessment),
        Step::AcknowledgeForFollowup => Transition::Run(Step::GenerateFollowup),
        Step::GenerateFollowup => Transition::WaitForUser,
        Step::AcknowledgeForStore => Transition::Run(Step::StoreAssessment),
        Step::StoreBasic | Step::StoreAssessment => Transition::Run(route_after_store(state, catalog)),
        Step::Finish => Transition::Terminal,
    };

    Ok(transition)
}

/// Basic questions go straight to storage; assessment questions are analyzed.
fn classify_by_kind(state: &TurnState, catalog: &[Question]) -> Result<Step, StateInvariantError> {
    let question = state.require_question(catalog)?;
    Ok(if question.max_followups == 0 {
        Step::StoreBasic
    } else {
        Step::Analyze
    })
}

fn route_after_analysis(state: &TurnState, catalog: &[Question]) -> Result<Step, StateInvariantError> {
    let question = state.require_question(catalog)?;
    let classification = state
        .classification
        .as_ref()
        .ok_or(StateInvariantError::MissingField("classification"))?;

    if classification.has_concern {
        return Ok(Step::RespondToConcern);
    }

    if classification.is_complete_answer || state.current_followup_count >= question.max_followups {
        return Ok(Step::AcknowledgeForStore);
    }

    Ok(Step::AcknowledgeForFollowup)
}

fn route_after_store(state: &TurnState, catalog: &[Question]) -> Step {
    if state.current_question_index < catalog.len() {
        Step::Ask
    } else {
        Step::Finish
    }
}
