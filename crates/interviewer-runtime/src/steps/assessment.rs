//! Assessment steps: classify, respond to concerns, acknowledge, follow up.

use interviewer_core::{FollowupExchange, StateInvariantError, TurnState, TurnUpdate};

use super::{StepContext, StepOutput};
use crate::engine::EngineError;

/// The answer given this turn, in its normalized form when there is one.
fn latest_answer(state: &TurnState) -> Result<&str, StateInvariantError> {
    state
        .normalized_answer
        .as_deref()
        .or(state.translated_answer.as_deref())
        .or(state.raw_answer.as_deref())
        .ok_or(StateInvariantError::MissingField("raw_answer"))
}

/// Concern and completeness checks, run concurrently.
pub(super) async fn analyze(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;
    let draft = state
        .draft
        .as_ref()
        .ok_or(StateInvariantError::MissingField("draft"))?;
    let answer = latest_answer(state)?;

    let classification = ctx
        .adapter
        .analyze(&ctx.config.interview_kind, question, answer, draft)
        .await;

    tracing::debug!(
        question_index = state.current_question_index,
        followups = state.current_followup_count,
        has_concern = classification.has_concern,
        is_complete = classification.is_complete_answer,
        "Answer classified"
    );

    let mut update = TurnUpdate::new();
    update.classification = Some(Some(classification));
    Ok(StepOutput::new(update))
}

pub(super) async fn respond_to_concern(
    state: &TurnState,
    ctx: &StepContext<'_>,
) -> Result<StepOutput, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;
    let classification = state
        .classification
        .as_ref()
        .ok_or(StateInvariantError::MissingField("classification"))?;
    let answer = latest_answer(state)?;

    tracing::info!(
        question_index = state.current_question_index,
        concern_kind = ?classification.concern_kind,
        "Concern flagged, storing without follow-up"
    );

    let response = ctx
        .adapter
        .concern_response(&ctx.config.interview_kind, question, answer, classification.concern_kind)
        .await;

    Ok(StepOutput::default().say(response))
}

/// Shared by acknowledge-for-followup and acknowledge-for-store.
pub(super) async fn acknowledge(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;
    let answer = latest_answer(state)?;

    let ack = ctx
        .adapter
        .acknowledge(&ctx.config.interview_kind, question, answer)
        .await;

    Ok(StepOutput::default().say(ack))
}

/// Ask one more probing question and open an exchange for its answer.
pub(super) async fn generate_followup(
    state: &TurnState,
    ctx: &StepContext<'_>,
) -> Result<StepOutput, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;
    let count = state.current_followup_count + 1;
    if count > question.max_followups {
        return Err(StateInvariantError::FollowupLimitExceeded {
            count,
            max: question.max_followups,
        }
        .into());
    }

    let mut draft = state
        .draft
        .clone()
        .ok_or(StateInvariantError::MissingField("draft"))?;

    let followup = ctx
        .adapter
        .followup(&ctx.config.interview_kind, question, &draft)
        .await;

    draft.followup_exchanges.push(FollowupExchange {
        question: followup.clone(),
        answer: None,
    });

    let mut update = TurnUpdate::new();
    update.current_followup_count = Some(count);
    update.draft = Some(Some(draft));

    Ok(StepOutput::new(update).say(followup))
}
