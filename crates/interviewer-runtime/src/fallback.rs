//! Canned interview text.
//!
//! Welcome, reprompt and closing text is always canned. Acknowledgements,
//! follow-ups and concern responses use these when the language service is
//! offline, failing, or its circuit is open.

use interviewer_core::validators::{SCALE_MAX, SCALE_MIN};
use interviewer_core::{ConcernKind, InterviewKind, Question, QuestionKind};

pub fn welcome(kind: &InterviewKind, question_count: usize) -> String {
    match kind {
        InterviewKind::Screener => format!(
            "Hi, and thanks for your interest! I have {} short questions to help us \
             get to know you. Answer in whatever language you are most comfortable with.",
            question_count
        ),
        InterviewKind::Exit => format!(
            "Thank you for taking the time for this exit interview. I have {} questions \
             about your experience. Your answers help us improve, and you can answer in \
             whatever language you prefer.",
            question_count
        ),
        InterviewKind::Unrecognized(_) => {
            format!("Welcome. I have {} questions for you.", question_count)
        }
    }
}

pub fn closing(kind: &InterviewKind) -> String {
    match kind {
        InterviewKind::Screener => {
            "That's everything. Thank you! Our team will review your answers and be in touch."
                .to_string()
        }
        InterviewKind::Exit => {
            "That concludes the interview. Thank you for your candor, and best of luck in \
             what comes next."
                .to_string()
        }
        InterviewKind::Unrecognized(_) => "That's all the questions. Thank you.".to_string(),
    }
}

/// Acknowledgement after a basic question, and the generation fallback.
pub fn acknowledgement(kind: &InterviewKind) -> String {
    match kind {
        InterviewKind::Exit => "Thank you for sharing that.".to_string(),
        _ => "Got it, thanks.".to_string(),
    }
}

pub fn followup(kind: &InterviewKind) -> String {
    match kind {
        InterviewKind::Exit => {
            "Could you tell me a little more about that? Any specific examples help.".to_string()
        }
        _ => "Could you tell me a bit more about that?".to_string(),
    }
}

pub fn concern_response(kind: &InterviewKind, concern: Option<ConcernKind>) -> String {
    match concern {
        Some(ConcernKind::OffTopic) => {
            "Thanks. Let's keep our focus on the interview questions.".to_string()
        }
        Some(ConcernKind::SensitiveDisclosure) | Some(ConcernKind::ReportableIncident) => {
            match kind {
                InterviewKind::Exit => "Thank you for telling me. What you've shared is important \
                     and will be passed to the appropriate team so it can be followed up properly."
                    .to_string(),
                _ => "Thank you for sharing that. I'll make sure it reaches the right people."
                    .to_string(),
            }
        }
        Some(ConcernKind::Other) | None => {
            "Thank you for sharing that. I've noted it for the team.".to_string()
        }
    }
}

/// Question text as shown to the interviewee.
///
/// Single-select options are numbered so index answers work; number-scale
/// questions carry their range.
pub fn present_question(question: &Question) -> String {
    match question.kind {
        QuestionKind::SingleSelect if !question.options().is_empty() => {
            let options = question
                .options()
                .iter()
                .enumerate()
                .map(|(i, option)| format!("{}. {}", i + 1, option))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}\n{}", question.text, options)
        }
        QuestionKind::NumberScale => {
            format!("{} ({}-{})", question.text, SCALE_MIN, SCALE_MAX)
        }
        _ => question.text.clone(),
    }
}

/// Validation error followed by the question to answer again.
pub fn reprompt(reason: Option<&str>, question_text: &str) -> String {
    let reason = reason.unwrap_or("Sorry, I didn't catch that.");
    format!("{}\n\n{}", reason, question_text)
}
