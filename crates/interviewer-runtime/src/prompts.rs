//! System prompts and request context for the language service.
//!
//! Prompts are static per purpose so providers can cache them; only the
//! context built here changes between calls.

use interviewer_core::{FollowupExchange, InterviewKind, Question};

use crate::language::Purpose;

/// Shared preamble for every purpose.
pub const BASE_SYSTEM_PROMPT: &str = r#"
You assist a structured interview. The interview script, its order and its
limits are fixed by the operator. You never decide what happens next; you
only perform the single task described below.

Be brief. Do not ask for personal details the question did not ask for.
Do not give advice, opinions or promises on behalf of the organization.
"#;

pub const TRANSLATE_PROMPT: &str = r#"
## Task: Translate

Translate the interviewee's answer into English.
If it is already English, return it exactly as written.
Return only the answer text, no quotes and no commentary.
"#;

pub const DETECT_CONCERN_PROMPT: &str = r#"
## Task: Detect concerns

Decide whether the answer contains content needing special handling:
- sensitive_disclosure: health, safety, self-harm or similar personal disclosures
- reportable_incident: harassment, discrimination, misconduct or other incidents
  that must be reported
- off_topic: content clearly outside the scope of the question

Reply with a single JSON object and nothing else:
{"has_concern": true | false, "concern_kind": "sensitive_disclosure" | "reportable_incident" | "off_topic" | null, "concern_detail": "one sentence" | null}

When unsure, reply has_concern false.
"#;

pub const CHECK_COMPLETENESS_PROMPT: &str = r#"
## Task: Check completeness

Decide whether the answer, together with any follow-up exchanges, gives a
substantive response to the question. One-word or evasive answers to an
open question are incomplete.

Reply with a single JSON object and nothing else:
{"is_complete_answer": true | false, "needs_more_context": true | false}

When unsure, reply is_complete_answer true.
"#;

pub const ACKNOWLEDGE_PROMPT: &str = r#"
## Task: Acknowledge

Write one short, neutral sentence acknowledging the answer. Do not evaluate
it, do not repeat it back at length, and do not ask a question.
"#;

pub const FOLLOWUP_PROMPT: &str = r#"
## Task: Follow-up question

Write one open follow-up question that invites the interviewee to expand on
their answer. Do not repeat earlier follow-ups. Return only the question.
"#;

pub const CONCERN_RESPONSE_PROMPT: &str = r#"
## Task: Respond to a concern

The answer was flagged for special handling. Write two short sentences:
thank the interviewee for sharing, and tell them the information will be
passed to the appropriate people. Do not investigate, diagnose or ask for
more detail.
"#;

/// Full system prompt for a purpose.
pub fn system_prompt(purpose: Purpose) -> String {
    let task = match purpose {
        Purpose::Translate => TRANSLATE_PROMPT,
        Purpose::DetectConcern => DETECT_CONCERN_PROMPT,
        Purpose::CheckCompleteness => CHECK_COMPLETENESS_PROMPT,
        Purpose::Acknowledge => ACKNOWLEDGE_PROMPT,
        Purpose::Followup => FOLLOWUP_PROMPT,
        Purpose::ConcernResponse => CONCERN_RESPONSE_PROMPT,
    };
    format!("{}\n{}", BASE_SYSTEM_PROMPT.trim(), task.trim())
}

/// Context for translation: just the answer.
pub fn translation_context(answer: &str) -> String {
    format!("Answer:\n{}", answer)
}

/// Context naming the interview, the question and the answer.
pub fn answer_context(kind: &InterviewKind, question: &Question, answer: &str) -> String {
    format!(
        "Interview: {}\nQuestion: {}\nAnswer:\n{}",
        kind, question.text, answer
    )
}

/// Answer context plus the follow-up exchanges so far.
pub fn exchange_context(
    kind: &InterviewKind,
    question: &Question,
    answer: &str,
    exchanges: &[FollowupExchange],
) -> String {
    let mut context = answer_context(kind, question, answer);
    for (i, exchange) in exchanges.iter().enumerate() {
        context.push_str(&format!("\nFollow-up {}: {}", i + 1, exchange.question));
        if let Some(reply) = &exchange.answer {
            context.push_str(&format!("\nReply {}: {}", i + 1, reply));
        }
    }
    context
}
