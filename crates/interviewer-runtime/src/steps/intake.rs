//! Intake steps: greet, ask, translate, validate, reprompt.

use chrono::Utc;

use interviewer_core::validators::{FormatValidator, FreeTextValidator};
use interviewer_core::{validate_answer, AnswerDraft, StateInvariantError, TurnState, TurnUpdate};

use super::{StepContext, StepOutput};
use crate::engine::EngineError;
use crate::fallback;

/// Validate the config, stamp the start time and greet.
pub(super) fn initialize(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    ctx.config.validate()?;

    let mut update = TurnUpdate::new();
    if state.started_at.is_none() {
        update.started_at = Some(Utc::now());
        tracing::info!(
            interview_kind = %ctx.config.interview_kind,
            questions = ctx.config.len(),
            offline = ctx.adapter.is_offline(),
            "Interview started"
        );
    } else {
        tracing::debug!(question_index = state.current_question_index, "Re-greeting a started interview");
    }

    Ok(StepOutput::new(update).say(fallback::welcome(&ctx.config.interview_kind, ctx.config.len())))
}

/// The follow-up question still waiting for an answer, if any.
fn open_followup(state: &TurnState) -> Option<&str> {
    if state.current_followup_count == 0 {
        return None;
    }
    state
        .draft
        .as_ref()
        .and_then(|d| d.followup_exchanges.last())
        .filter(|e| e.answer.is_none())
        .map(|e| e.question.as_str())
}

/// Ask the current question, or the open follow-up when resuming mid follow-up.
pub(super) fn ask(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;
    let text = match open_followup(state) {
        Some(followup) => followup.to_string(),
        None => fallback::present_question(question),
    };
    Ok(StepOutput::default().say(text))
}

/// Take the pending user message as this turn's answer and translate it.
///
/// Clears the previous turn's scratch fields.
pub(super) async fn translate(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let answer = state
        .pending_user_message()
        .ok_or(StateInvariantError::NoPendingAnswer)?;

    let translation = ctx.adapter.translate(answer).await;

    let mut update = TurnUpdate::new().clear_scratch();
    update.raw_answer = Some(Some(answer.to_string()));
    update.translated_answer = Some(Some(translation.text));
    update.was_translated = Some(translation.was_translated);

    Ok(StepOutput::new(update))
}

/// Check the answer's format and record it into the draft.
///
/// A primary answer is checked against the question's kind and starts a new
/// draft. A follow-up answer is free text and fills the open exchange.
pub(super) fn validate_format(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;
    let raw = state
        .raw_answer
        .as_deref()
        .ok_or(StateInvariantError::MissingField("raw_answer"))?;
    let answer = state.translated_answer.as_deref().unwrap_or(raw);

    let outcome = if state.current_followup_count == 0 {
        validate_answer(question, answer)
    } else {
        FreeTextValidator::new().validate(answer)
    };
    let mut update = TurnUpdate::new();

    if !outcome.valid {
        tracing::debug!(
            question_index = state.current_question_index,
            kind = %question.kind,
            "Answer failed format validation"
        );
        update.needs_reprompt = Some(true);
        update.reprompt_reason = Some(outcome.error_message);
        return Ok(StepOutput::new(update));
    }

    let normalized = outcome.normalized_value;

    let draft = if state.current_followup_count == 0 {
        AnswerDraft {
            raw_answer: raw.to_string(),
            translated_answer: state.was_translated.then(|| answer.to_string()),
            normalized_answer: normalized.clone(),
            was_translated: state.was_translated,
            followup_exchanges: Vec::new(),
        }
    } else {
        let mut draft = state
            .draft
            .clone()
            .ok_or(StateInvariantError::MissingField("draft"))?;
        let exchange = draft
            .followup_exchanges
            .last_mut()
            .ok_or(StateInvariantError::MissingField("followup_exchanges"))?;
        exchange.answer = Some(normalized.clone().unwrap_or_else(|| answer.to_string()));
        draft
    };

    update.normalized_answer = Some(normalized);
    update.needs_reprompt = Some(false);
    update.reprompt_reason = Some(None);
    update.draft = Some(Some(draft));

    Ok(StepOutput::new(update))
}

/// Explain the rejection and ask again.
///
/// While a follow-up is open, the follow-up is what gets asked again.
pub(super) fn reprompt(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;

    let question_text = match open_followup(state) {
        Some(followup) => followup.to_string(),
        None => fallback::present_question(question),
    };

    Ok(StepOutput::default().say(fallback::reprompt(state.reprompt_reason.as_deref(), &question_text)))
}
