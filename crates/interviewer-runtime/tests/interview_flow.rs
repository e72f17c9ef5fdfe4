//! End-to-end interview flows driven through the engine.

use std::sync::Arc;
use std::time::Duration;

use interviewer_core::{
    ConcernKind, InterviewConfig, InterviewKind, Question, QuestionKind, Role, TurnState,
};
use interviewer_runtime::{
    InterviewEngine, Purpose, RuntimeConfig, ScriptedLanguageService, TurnOutcome, TurnStatus,
};

const NO_CONCERN: &str = r#"{"has_concern": false}"#;
const INCOMPLETE: &str = r#"{"is_complete_answer": false, "needs_more_context": true}"#;
const COMPLETE: &str = r#"{"is_complete_answer": true}"#;

fn config(kind: InterviewKind, questions: Vec<Question>) -> InterviewConfig {
    InterviewConfig::new(kind, questions)
}

fn engine_with(config: InterviewConfig, service: &ScriptedLanguageService) -> InterviewEngine {
    InterviewEngine::builder(config)
        .service(Arc::new(service.clone()))
        .build()
}

fn offline_engine(config: InterviewConfig) -> InterviewEngine {
    InterviewEngine::builder(config).offline(true).build()
}

async fn answer(engine: &InterviewEngine, outcome: TurnOutcome, text: &str) -> TurnOutcome {
    engine.handle_message(outcome.state, text).await.unwrap()
}

#[tokio::test]
async fn test_yes_no_basic_question_goes_straight_to_finish() {
    let service = ScriptedLanguageService::new();
    let engine = engine_with(
        config(
            InterviewKind::Screener,
            vec![Question::new(QuestionKind::YesNo, "Are you 18 or older?")],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let done = answer(&engine, started, "yep").await;

    assert_eq!(done.status, TurnStatus::Finished);
    let transcript = done.transcript().unwrap();
    assert_eq!(transcript.responses.len(), 1);
    assert_eq!(transcript.responses[0].normalized_answer.as_deref(), Some("yes"));
    assert_eq!(transcript.responses[0].raw_answer, "yep");
    assert!(transcript.responses[0].followup_exchanges.is_empty());

    // Basic questions are never classified.
    assert_eq!(service.calls_for(Purpose::DetectConcern), 0);
    assert_eq!(service.calls_for(Purpose::CheckCompleteness), 0);
    assert_eq!(service.calls_for(Purpose::Followup), 0);
}

#[tokio::test]
async fn test_single_select_letter_index() {
    let engine = offline_engine(config(
        InterviewKind::Screener,
        vec![Question::new(QuestionKind::SingleSelect, "How urgent is your search?")
            .with_options(["Low", "Medium", "High"])],
    ));

    let started = engine.start().await.unwrap();
    assert!(started.messages[1].content.contains("2. Medium"));

    let done = answer(&engine, started, "b").await;
    let transcript = done.transcript().unwrap();
    assert_eq!(transcript.responses[0].normalized_answer.as_deref(), Some("Medium"));
}

#[tokio::test]
async fn test_phone_number_country_code_stripped() {
    let engine = offline_engine(config(
        InterviewKind::Screener,
        vec![Question::new(QuestionKind::PhoneNumber, "Best number to reach you?")],
    ));

    let started = engine.start().await.unwrap();
    let done = answer(&engine, started, "+1 (555) 123-4567").await;
    assert_eq!(
        done.transcript().unwrap().responses[0].normalized_answer.as_deref(),
        Some("5551234567")
    );
}

#[tokio::test]
async fn test_followups_bounded_by_max() {
    let service = ScriptedLanguageService::new()
        .with_fallback_reply(Purpose::DetectConcern, NO_CONCERN)
        .with_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_reply(Purpose::Followup, "What drove that decision?")
        .with_reply(Purpose::Followup, "Was anything else a factor?")
        .with_fallback_reply(Purpose::Acknowledge, "Thanks for explaining.");
    let engine = engine_with(
        config(
            InterviewKind::Exit,
            vec![Question::new(QuestionKind::LongAnswer, "Why are you leaving?").with_max_followups(2)],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();

    let first = answer(&engine, started, "Personal reasons.").await;
    assert_eq!(first.status, TurnStatus::AwaitingInput);
    assert_eq!(first.state.current_followup_count, 1);
    assert_eq!(first.messages.len(), 2);
    assert_eq!(first.messages[1].content, "What drove that decision?");

    let second = answer(&engine, first, "Commute.").await;
    assert_eq!(second.state.current_followup_count, 2);
    assert_eq!(second.messages[1].content, "Was anything else a factor?");

    // Third incomplete verdict: the budget is spent, so acknowledge and store.
    let third = answer(&engine, second, "Not really.").await;
    assert_eq!(third.status, TurnStatus::Finished);
    assert_eq!(third.messages[0].content, "Thanks for explaining.");

    let response = &third.transcript().unwrap().responses[0];
    assert_eq!(response.raw_answer, "Personal reasons.");
    assert_eq!(response.followup_exchanges.len(), 2);
    assert_eq!(response.followup_exchanges[0].answer.as_deref(), Some("Commute."));
    assert_eq!(response.followup_exchanges[1].answer.as_deref(), Some("Not really."));
    assert_eq!(service.calls_for(Purpose::Followup), 2);
    assert_eq!(service.calls_for(Purpose::CheckCompleteness), 3);
}

#[tokio::test]
async fn test_failing_concern_check_does_not_abort() {
    let service = ScriptedLanguageService::new()
        .with_error(Purpose::DetectConcern, "upstream exploded")
        .with_reply(Purpose::CheckCompleteness, COMPLETE);
    let engine = engine_with(
        config(
            InterviewKind::Exit,
            vec![Question::new(QuestionKind::LongAnswer, "How was your team?").with_max_followups(1)],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let done = answer(&engine, started, "Supportive and kind.").await;

    assert!(done.is_finished());
    let response = &done.transcript().unwrap().responses[0];
    assert!(!response.had_concern);
    assert!(response.concern_kind.is_none());
    assert_eq!(done.transcript().unwrap().concerns_detected, 0);
}

#[tokio::test]
async fn test_concern_dominates_incomplete_answer() {
    let service = ScriptedLanguageService::new()
        .with_reply(
            Purpose::DetectConcern,
            r#"{"has_concern": true, "concern_kind": "reportable_incident", "concern_detail": "harassment by a manager"}"#,
        )
        .with_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_reply(Purpose::ConcernResponse, "Thank you for telling me. This will be passed on.");
    let engine = engine_with(
        config(
            InterviewKind::Exit,
            vec![
                Question::new(QuestionKind::LongAnswer, "How was your manager?").with_max_followups(2),
                Question::new(QuestionKind::YesNo, "Would you return?"),
            ],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let after = answer(&engine, started, "He yelled at me in front of everyone.").await;

    // Concern response, then straight on to the next question.
    assert_eq!(after.messages[0].content, "Thank you for telling me. This will be passed on.");
    assert_eq!(after.messages[1].content, "Would you return?");
    assert_eq!(after.state.current_question_index, 1);
    assert_eq!(after.state.current_followup_count, 0);
    assert_eq!(service.calls_for(Purpose::Followup), 0);

    let response = &after.state.responses[0];
    assert!(response.had_concern);
    assert_eq!(response.concern_kind, Some(ConcernKind::ReportableIncident));
    assert!(response.followup_exchanges.is_empty());

    let done = answer(&engine, after, "no").await;
    assert_eq!(done.transcript().unwrap().concerns_detected, 1);
}

#[tokio::test]
async fn test_concern_on_followup_answer_stops_probing() {
    let service = ScriptedLanguageService::new()
        .with_reply(Purpose::DetectConcern, NO_CONCERN)
        .with_reply(Purpose::DetectConcern, r#"{"has_concern": true, "concern_kind": "sensitive_disclosure"}"#)
        .with_fallback_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_reply(Purpose::Followup, "Can you say more?");
    let engine = engine_with(
        config(
            InterviewKind::Exit,
            vec![Question::new(QuestionKind::LongAnswer, "Why are you leaving?").with_max_followups(3)],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let first = answer(&engine, started, "Stress.").await;
    assert_eq!(first.state.current_followup_count, 1);

    let done = answer(&engine, first, "My health has been suffering badly.").await;
    assert!(done.is_finished());

    let response = &done.transcript().unwrap().responses[0];
    assert!(response.had_concern);
    assert_eq!(response.concern_kind, Some(ConcernKind::SensitiveDisclosure));
    assert_eq!(response.followup_exchanges.len(), 1);
    assert_eq!(service.calls_for(Purpose::Followup), 1);
}

#[tokio::test]
async fn test_invalid_answer_reprompts_until_valid() {
    let engine = offline_engine(config(
        InterviewKind::Screener,
        vec![Question::new(QuestionKind::NumberScale, "Rate your SQL skills")],
    ));

    let started = engine.start().await.unwrap();

    let rejected = answer(&engine, started, "eleven").await;
    assert_eq!(rejected.status, TurnStatus::AwaitingInput);
    assert!(rejected.state.needs_reprompt);
    assert_eq!(rejected.state.current_question_index, 0);
    assert!(rejected.state.responses.is_empty());
    assert!(rejected.messages[0].content.ends_with("Rate your SQL skills (1-10)"));

    let rejected_again = answer(&engine, rejected, "11").await;
    assert!(rejected_again.state.needs_reprompt);

    let done = answer(&engine, rejected_again, " 7 ").await;
    assert!(done.is_finished());
    assert!(!done.state.needs_reprompt);
    assert_eq!(done.state.responses[0].normalized_answer.as_deref(), Some("7"));
    assert_eq!(done.state.responses[0].raw_answer, " 7 ");
}

#[tokio::test]
async fn test_followup_count_resets_on_next_question() {
    let service = ScriptedLanguageService::new()
        .with_fallback_reply(Purpose::DetectConcern, NO_CONCERN)
        .with_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_fallback_reply(Purpose::CheckCompleteness, COMPLETE);
    let engine = engine_with(
        config(
            InterviewKind::Exit,
            vec![
                Question::new(QuestionKind::LongAnswer, "What went well?").with_max_followups(1),
                Question::new(QuestionKind::LongAnswer, "What could improve?").with_max_followups(1),
            ],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let followed_up = answer(&engine, started, "Team.").await;
    assert_eq!(followed_up.state.current_followup_count, 1);

    let next = answer(&engine, followed_up, "Good people.").await;
    assert_eq!(next.state.current_question_index, 1);
    assert_eq!(next.state.current_followup_count, 0);
    assert_eq!(next.messages.last().unwrap().content, "What could improve?");
    assert_eq!(next.state.responses[0].followup_exchanges.len(), 1);
    // Generated follow-up failed, so the canned one was used.
    assert!(!next.state.responses[0].followup_exchanges[0].question.is_empty());
}

#[tokio::test]
async fn test_translation_recorded() {
    let service = ScriptedLanguageService::new()
        .with_reply(Purpose::Translate, "Yes, absolutely")
        .with_reply(Purpose::Translate, "yes");
    let engine = engine_with(
        config(
            InterviewKind::Screener,
            vec![
                Question::new(QuestionKind::ShortAnswer, "Can you relocate?"),
                Question::new(QuestionKind::YesNo, "Do you have a license?"),
            ],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let first = answer(&engine, started, "Sí, absolutamente").await;
    let done = answer(&engine, first, "Yes").await;

    let responses = &done.transcript().unwrap().responses;
    assert!(responses[0].was_translated);
    assert_eq!(responses[0].raw_answer, "Sí, absolutamente");
    assert_eq!(responses[0].translated_answer.as_deref(), Some("Yes, absolutely"));
    assert!(!responses[1].was_translated);
    assert!(responses[1].translated_answer.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hung_service_is_bounded_by_timeout() {
    let service = ScriptedLanguageService::new()
        .with_fallback_reply(Purpose::DetectConcern, r#"{"has_concern": true}"#)
        .with_fallback_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_delay(Duration::from_secs(120));
    let engine = InterviewEngine::builder(config(
        InterviewKind::Exit,
        vec![Question::new(QuestionKind::LongAnswer, "Anything else?").with_max_followups(2)],
    ))
    .service(Arc::new(service.clone()))
    .runtime_config(RuntimeConfig::default().with_call_timeout(Some(Duration::from_secs(10))))
    .build();

    let started = engine.start().await.unwrap();
    let done = answer(&engine, started, "No, that's all.").await;

    // Every call timed out: no concern, answer treated as complete.
    assert!(done.is_finished());
    let response = &done.transcript().unwrap().responses[0];
    assert!(!response.had_concern);
    assert!(response.followup_exchanges.is_empty());
}

#[tokio::test]
async fn test_offline_mode_issues_no_calls() {
    let service = ScriptedLanguageService::new()
        .with_fallback_reply(Purpose::DetectConcern, r#"{"has_concern": true}"#)
        .with_fallback_reply(Purpose::CheckCompleteness, INCOMPLETE);
    let engine = InterviewEngine::builder(
        config(
            InterviewKind::Exit,
            vec![Question::new(QuestionKind::LongAnswer, "Why are you leaving?").with_max_followups(2)],
        )
        .offline(true),
    )
    .service(Arc::new(service.clone()))
    .build();

    let started = engine.start().await.unwrap();
    let done = answer(&engine, started, "Better offer elsewhere.").await;

    assert!(done.is_finished());
    assert_eq!(service.call_count(), 0);
    assert!(!done.state.responses[0].had_concern);
}

#[tokio::test]
async fn test_transcript_and_state_survive_persistence() {
    let engine = offline_engine(config(
        InterviewKind::Screener,
        vec![
            Question::new(QuestionKind::ShortAnswer, "What is your name?").with_group("identity"),
            Question::new(QuestionKind::YesNo, "Can you work weekends?"),
        ],
    ));

    let started = engine.start().await.unwrap();

    // Persist and reload between every turn.
    let reload = |state: &TurnState| -> TurnState {
        serde_json::from_str(&serde_json::to_string(state).unwrap()).unwrap()
    };

    let first = engine.handle_message(reload(&started.state), "Ada").await.unwrap();
    let done = engine.handle_message(reload(&first.state), "no").await.unwrap();

    let transcript = done.transcript().unwrap();
    assert_eq!(transcript.interview_kind, InterviewKind::Screener);
    assert_eq!(transcript.question_count, 2);
    assert_eq!(transcript.questions_answered, 2);
    assert_eq!(transcript.concerns_detected, 0);
    assert_eq!(transcript.responses[0].group.as_deref(), Some("identity"));
    assert!(transcript.completed_at >= transcript.started_at);

    // Full log mirrors the message log, closing message last.
    assert_eq!(transcript.full_log.len(), done.state.message_log.len());
    let last = transcript.full_log.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(&last.content, &done.messages.last().unwrap().content);
    assert_eq!(
        transcript.full_log.iter().filter(|e| e.role == Role::User).count(),
        2
    );
}

#[tokio::test]
async fn test_resume_mid_followup_reasks_followup() {
    let service = ScriptedLanguageService::new()
        .with_fallback_reply(Purpose::DetectConcern, NO_CONCERN)
        .with_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_fallback_reply(Purpose::CheckCompleteness, COMPLETE)
        .with_reply(Purpose::Followup, "Which manager?");
    let engine = engine_with(
        config(
            InterviewKind::Exit,
            vec![Question::new(QuestionKind::LongAnswer, "Why are you leaving?").with_max_followups(2)],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let followed_up = answer(&engine, started, "My manager.").await;
    assert_eq!(followed_up.messages.last().unwrap().content, "Which manager?");

    // Host re-enters without a new message.
    let resumed = engine.run_turn(followed_up.state).await.unwrap();
    assert_eq!(resumed.status, TurnStatus::AwaitingInput);
    assert_eq!(resumed.messages.last().unwrap().content, "Which manager?");
    assert_eq!(resumed.state.current_followup_count, 1);

    let done = answer(&engine, resumed, "The one who joined last spring.").await;
    let response = &done.transcript().unwrap().responses[0];
    assert_eq!(response.raw_answer, "My manager.");
    assert_eq!(response.followup_exchanges.len(), 1);
    assert_eq!(response.followup_exchanges[0].question, "Which manager?");
    assert_eq!(
        response.followup_exchanges[0].answer.as_deref(),
        Some("The one who joined last spring.")
    );
}

#[tokio::test]
async fn test_followup_on_yes_no_accepts_free_text() {
    let service = ScriptedLanguageService::new()
        .with_fallback_reply(Purpose::DetectConcern, NO_CONCERN)
        .with_fallback_reply(Purpose::CheckCompleteness, INCOMPLETE)
        .with_reply(Purpose::Followup, "What would change your mind?");
    let engine = engine_with(
        config(
            InterviewKind::Exit,
            vec![Question::new(QuestionKind::YesNo, "Would you return?").with_max_followups(1)],
        ),
        &service,
    );

    let started = engine.start().await.unwrap();
    let followed_up = answer(&engine, started, "no").await;
    assert_eq!(followed_up.messages.last().unwrap().content, "What would change your mind?");

    let done = answer(&engine, followed_up, "A better manager and more pay").await;
    assert!(done.is_finished());
    assert!(!done.state.needs_reprompt);

    let response = &done.transcript().unwrap().responses[0];
    assert_eq!(response.normalized_answer.as_deref(), Some("no"));
    assert_eq!(
        response.followup_exchanges[0].answer.as_deref(),
        Some("A better manager and more pay")
    );
}
