//! Storage steps: turn the draft into a stored response, and finish.

use chrono::Utc;

use interviewer_core::{
    Message, StateInvariantError, StoredResponse, TranscriptBuilder, TurnState, TurnUpdate,
};

use super::{StepContext, StepOutput};
use crate::engine::EngineError;
use crate::fallback;

/// Store a basic question's answer and acknowledge it.
pub(super) fn store_basic(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let update = store(state, ctx)?;
    Ok(StepOutput::new(update).say(fallback::acknowledgement(&ctx.config.interview_kind)))
}

/// Store an assessment answer. Acknowledgement already happened.
pub(super) fn store_assessment(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    Ok(StepOutput::new(store(state, ctx)?))
}

/// Build the stored response, advance the index and reset the scratch.
fn store(state: &TurnState, ctx: &StepContext<'_>) -> Result<TurnUpdate, EngineError> {
    let question = state.require_question(&ctx.config.questions)?;
    let draft = state
        .draft
        .clone()
        .ok_or(StateInvariantError::MissingField("draft"))?;

    let (had_concern, concern_kind) = state
        .classification
        .as_ref()
        .map(|c| (c.has_concern, c.concern_kind.filter(|_| c.has_concern)))
        .unwrap_or((false, None));

    let response = StoredResponse {
        question_index: state.current_question_index,
        question_text: question.text.clone(),
        question_kind: question.kind.clone(),
        group: question.group.clone(),
        raw_answer: draft.raw_answer,
        translated_answer: draft.translated_answer,
        normalized_answer: draft.normalized_answer,
        was_translated: draft.was_translated,
        was_skipped: false,
        had_concern,
        concern_kind,
        followup_exchanges: draft.followup_exchanges,
    };

    tracing::debug!(
        question_index = state.current_question_index,
        followups = response.followup_exchanges.len(),
        had_concern,
        "Response stored"
    );

    let mut update = TurnUpdate::new().clear_scratch();
    update.stored_response = Some(response);
    update.current_question_index = Some(state.current_question_index + 1);
    update.draft = Some(None);
    Ok(update)
}

/// Build the transcript once and say goodbye.
pub(super) fn finish(state: &TurnState, ctx: &StepContext<'_>) -> Result<StepOutput, EngineError> {
    let closing = Message::assistant(fallback::closing(&ctx.config.interview_kind));
    let completed_at = Utc::now();

    let transcript = TranscriptBuilder::new(ctx.config.interview_kind.clone(), ctx.config.len())
        .build(state, &closing, completed_at)?;

    tracing::info!(
        interview_kind = %transcript.interview_kind,
        questions_answered = transcript.questions_answered,
        concerns_detected = transcript.concerns_detected,
        "Interview finished"
    );

    let mut update = TurnUpdate::new();
    update.final_transcript = Some(transcript);
    update.is_finished = Some(true);

    Ok(StepOutput {
        update,
        messages: vec![closing],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::LanguageAdapter;
    use interviewer_core::{
        AnswerDraft, Classification, ConcernKind, InterviewConfig, InterviewKind, Question, QuestionKind,
    };

    fn config() -> InterviewConfig {
        InterviewConfig::new(
            InterviewKind::Exit,
            vec![
                Question::new(QuestionKind::YesNo, "Would you return?").with_group("sentiment"),
                Question::new(QuestionKind::LongAnswer, "Why are you leaving?").with_max_followups(2),
            ],
        )
    }

    fn drafted(index: usize) -> TurnState {
        TurnState {
            started_at: Some(Utc::now()),
            current_question_index: index,
            raw_answer: Some("Yep".into()),
            normalized_answer: Some("yes".into()),
            draft: Some(AnswerDraft {
                raw_answer: "Yep".into(),
                translated_answer: None,
                normalized_answer: Some("yes".into()),
                was_translated: false,
                followup_exchanges: vec![],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_store_basic_advances_and_clears() {
        let config = config();
        let adapter = LanguageAdapter::offline();
        let ctx = StepContext { config: &config, adapter: &adapter };

        let output = store_basic(&drafted(0), &ctx).unwrap();
        let response = output.update.stored_response.as_ref().unwrap();
        assert_eq!(response.question_index, 0);
        assert_eq!(response.group.as_deref(), Some("sentiment"));
        assert_eq!(response.normalized_answer.as_deref(), Some("yes"));
        assert!(!response.had_concern);
        assert_eq!(output.update.current_question_index, Some(1));
        assert_eq!(output.update.draft, Some(None));
        assert_eq!(output.update.raw_answer, Some(None));
        assert_eq!(output.messages.len(), 1);
    }

    #[test]
    fn test_store_assessment_carries_concern() {
        let config = config();
        let adapter = LanguageAdapter::offline();
        let ctx = StepContext { config: &config, adapter: &adapter };

        let mut state = drafted(1);
        state.classification = Some(Classification {
            has_concern: true,
            concern_kind: Some(ConcernKind::ReportableIncident),
            is_complete_answer: false,
            ..Default::default()
        });

        let output = store_assessment(&state, &ctx).unwrap();
        let response = output.update.stored_response.unwrap();
        assert!(response.had_concern);
        assert_eq!(response.concern_kind, Some(ConcernKind::ReportableIncident));
        assert!(response.followup_exchanges.is_empty());
        assert!(output.messages.is_empty());
    }

    #[test]
    fn test_store_without_draft_is_invariant_error() {
        let config = config();
        let adapter = LanguageAdapter::offline();
        let ctx = StepContext { config: &config, adapter: &adapter };

        let mut state = drafted(0);
        state.draft = None;
        let err = store_basic(&state, &ctx).unwrap_err();
        assert!(matches!(
            err,
            EngineError::StateInvariant(StateInvariantError::MissingField("draft"))
        ));
    }

    #[test]
    fn test_finish_builds_transcript_with_closing_last() {
        let config = config();
        let adapter = LanguageAdapter::offline();
        let ctx = StepContext { config: &config, adapter: &adapter };

        let mut state = drafted(2);
        state.append_messages([Message::assistant("Welcome"), Message::user("Yep")]);

        let output = finish(&state, &ctx).unwrap();
        let transcript = output.update.final_transcript.as_ref().unwrap();
        assert_eq!(transcript.question_count, 2);
        assert_eq!(transcript.full_log.len(), 3);
        assert_eq!(transcript.full_log[2].content, output.messages[0].content);
        assert_eq!(output.update.is_finished, Some(true));
    }
}
