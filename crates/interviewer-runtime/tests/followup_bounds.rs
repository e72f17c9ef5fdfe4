//! Follow-up limits hold for any sequence of completeness verdicts.

use std::sync::Arc;

use interviewer_core::{InterviewConfig, InterviewKind, Question, QuestionKind};
use interviewer_runtime::{InterviewEngine, Purpose, ScriptedLanguageService, ScriptedReply};
use proptest::prelude::*;

fn verdict(complete: bool) -> String {
    format!(r#"{{"is_complete_answer": {}}}"#, complete)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_followups_never_exceed_max(
        max in 0u32..4,
        verdicts in proptest::collection::vec(any::<bool>(), 0..8),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let service = ScriptedLanguageService::new()
            .with_fallback_reply(Purpose::DetectConcern, r#"{"has_concern": false}"#)
            .with_fallback_reply(Purpose::CheckCompleteness, verdict(false));
        for complete in &verdicts {
            service.push(Purpose::CheckCompleteness, ScriptedReply::Text(verdict(*complete)));
        }

        let engine = InterviewEngine::builder(InterviewConfig::new(
            InterviewKind::Exit,
            vec![
                Question::new(QuestionKind::LongAnswer, "Why are you leaving?").with_max_followups(max),
                Question::new(QuestionKind::LongAnswer, "Anything else?").with_max_followups(max),
            ],
        ))
        .service(Arc::new(service.clone()))
        .build();

        let state = runtime.block_on(async {
            let mut outcome = engine.start().await.unwrap();
            let mut turns = 0;
            while !outcome.is_finished() {
                prop_assert!(turns < 2 * (max as usize + 1), "interview did not terminate");
                outcome = engine.handle_message(outcome.state, "Some answer.").await.unwrap();
                prop_assert!(outcome.state.current_followup_count <= max);
                turns += 1;
            }
            Ok::<_, TestCaseError>(outcome.state)
        })?;

        prop_assert_eq!(state.responses.len(), 2);
        for response in &state.responses {
            prop_assert!(response.followup_exchanges.len() <= max as usize);
            prop_assert!(response.followup_exchanges.iter().all(|e| e.answer.is_some()));
        }
        prop_assert!(service.calls_for(Purpose::Followup) <= 2 * max as usize);
    }
}
