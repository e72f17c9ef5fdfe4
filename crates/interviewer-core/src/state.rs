//! Turn state: the progress record carried between turns.
//!
//! Step handlers never mutate [`TurnState`] directly. They return a
//! [`TurnUpdate`] which [`TurnState::apply`] merges while enforcing the
//! progress invariants:
//! - the question index never decreases and never passes the catalog end
//! - the follow-up count resets whenever the index changes and never
//!   exceeds the current question's `max_followups`
//! - at most one stored response per question index
//! - the final transcript is set once
//! - a finished interview sits exactly at the end of the catalog
//!
//! The message log and the stored responses only ever grow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Question, QuestionKind};
use crate::transcript::FinalTranscript;

/// Errors raised when a turn state is corrupted or mis-sequenced.
///
/// These are fatal for the turn and never recoverable by the interviewee.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateInvariantError {
    #[error("No current question at index {index} (catalog has {catalog_len})")]
    NoCurrentQuestion { index: usize, catalog_len: usize },

    #[error("Required field is absent: {0}")]
    MissingField(&'static str),

    #[error("No user message is waiting to be processed")]
    NoPendingAnswer,

    #[error("Question index cannot move backwards ({from} -> {to})")]
    IndexRegression { from: usize, to: usize },

    #[error("Follow-up count {count} exceeds the limit of {max}")]
    FollowupLimitExceeded { count: u32, max: u32 },

    #[error("A response is already stored for question {index}")]
    DuplicateResponse { index: usize },

    #[error("Final transcript has already been built")]
    TranscriptAlreadySet,

    #[error("Interview is finished and cannot take another turn")]
    AlreadyFinished,

    #[error("Finished interview must sit at the catalog end (index {index}, catalog has {catalog_len})")]
    FinishedBeforeEnd { index: usize, catalog_len: usize },
}

/// Who authored a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Category of a flagged answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernKind {
    /// Sensitive personal disclosure (health, safety, self-harm)
    SensitiveDisclosure,
    /// Content outside the interview's scope
    OffTopic,
    /// An incident that must be reported (harassment, misconduct)
    ReportableIncident,
    Other,
}

/// Verdicts on the current answer of an assessment question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub has_concern: bool,
    pub concern_kind: Option<ConcernKind>,
    pub concern_detail: Option<String>,
    pub is_complete_answer: bool,
    pub needs_more_context: bool,
}

impl Default for Classification {
    /// No concern and a complete answer: the safe default.
    fn default() -> Self {
        Self {
            has_concern: false,
            concern_kind: None,
            concern_detail: None,
            is_complete_answer: true,
            needs_more_context: false,
        }
    }
}

/// A generated follow-up question and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowupExchange {
    pub question: String,
    pub answer: Option<String>,
}

/// The answer collected for the current question so far.
///
/// Holds the primary answer while follow-ups are asked and becomes exactly
/// one [`StoredResponse`] when the question is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDraft {
    pub raw_answer: String,
    pub translated_answer: Option<String>,
    pub normalized_answer: Option<String>,
    pub was_translated: bool,
    #[serde(default)]
    pub followup_exchanges: Vec<FollowupExchange>,
}

/// The stored result for one answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub question_index: usize,
    pub question_text: String,
    pub question_kind: QuestionKind,
    pub group: Option<String>,
    pub raw_answer: String,
    pub translated_answer: Option<String>,
    pub normalized_answer: Option<String>,
    pub was_translated: bool,
    pub was_skipped: bool,
    pub had_concern: bool,
    pub concern_kind: Option<ConcernKind>,
    pub followup_exchanges: Vec<FollowupExchange>,
}

/// Progress record for one interview thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    pub current_question_index: usize,
    pub current_followup_count: u32,

    // Per-turn scratch
    pub raw_answer: Option<String>,
    pub translated_answer: Option<String>,
    pub normalized_answer: Option<String>,
    pub was_translated: bool,
    pub classification: Option<Classification>,
    pub needs_reprompt: bool,
    pub reprompt_reason: Option<String>,

    /// Answer being assembled for the current question
    pub draft: Option<AnswerDraft>,

    pub message_log: Vec<Message>,
    pub responses: Vec<StoredResponse>,

    pub started_at: Option<DateTime<Utc>>,
    pub is_finished: bool,
    pub final_transcript: Option<FinalTranscript>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_question<'a>(&self, catalog: &'a [Question]) -> Option<&'a Question> {
        catalog.get(self.current_question_index)
    }

    /// Like [`Self::current_question`] but missing is an invariant violation.
    pub fn require_question<'a>(
        &self,
        catalog: &'a [Question],
    ) -> Result<&'a Question, StateInvariantError> {
        self.current_question(catalog)
            .ok_or(StateInvariantError::NoCurrentQuestion {
                index: self.current_question_index,
                catalog_len: catalog.len(),
            })
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.message_log.last()
    }

    /// Latest user message content, if the log ends with one.
    pub fn pending_user_message(&self) -> Option<&str> {
        self.last_message()
            .filter(|m| m.is_user())
            .map(|m| m.content.as_str())
    }

    pub fn append_messages(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.message_log.extend(messages);
    }

    /// Number of stored responses carrying a concern flag.
    pub fn concern_count(&self) -> usize {
        self.responses.iter().filter(|r| r.had_concern).count()
    }

    /// Merge a step's partial update, enforcing the progress invariants.
    ///
    /// On error the state is left unchanged.
    pub fn apply(
        &mut self,
        update: TurnUpdate,
        catalog: &[Question],
    ) -> Result<(), StateInvariantError> {
        let mut next = self.clone();

        if let Some(index) = update.current_question_index {
            if index < next.current_question_index {
                return Err(StateInvariantError::IndexRegression {
                    from: next.current_question_index,
                    to: index,
                });
            }
            if index > catalog.len() {
                return Err(StateInvariantError::NoCurrentQuestion {
                    index,
                    catalog_len: catalog.len(),
                });
            }
            if index != next.current_question_index {
                next.current_question_index = index;
                next.current_followup_count = 0;
            }
        }

        if let Some(count) = update.current_followup_count {
            next.current_followup_count = count;
        }
        if let Some(question) = catalog.get(next.current_question_index) {
            if next.current_followup_count > question.max_followups {
                return Err(StateInvariantError::FollowupLimitExceeded {
                    count: next.current_followup_count,
                    max: question.max_followups,
                });
            }
        }

        if let Some(value) = update.raw_answer {
            next.raw_answer = value;
        }
        if let Some(value) = update.translated_answer {
            next.translated_answer = value;
        }
        if let Some(value) = update.normalized_answer {
            next.normalized_answer = value;
        }
        if let Some(value) = update.was_translated {
            next.was_translated = value;
        }
        if let Some(value) = update.classification {
            next.classification = value;
        }
        if let Some(value) = update.needs_reprompt {
            next.needs_reprompt = value;
        }
        if let Some(value) = update.reprompt_reason {
            next.reprompt_reason = value;
        }
        if let Some(value) = update.draft {
            next.draft = value;
        }

        if let Some(response) = update.stored_response {
            if next
                .responses
                .iter()
                .any(|r| r.question_index == response.question_index)
            {
                return Err(StateInvariantError::DuplicateResponse {
                    index: response.question_index,
                });
            }
            next.responses.push(response);
        }

        if let Some(started_at) = update.started_at {
            next.started_at = Some(started_at);
        }

        if let Some(transcript) = update.final_transcript {
            if next.final_transcript.is_some() {
                return Err(StateInvariantError::TranscriptAlreadySet);
            }
            next.final_transcript = Some(transcript);
        }

        if let Some(finished) = update.is_finished {
            next.is_finished = finished;
        }
        if next.is_finished && next.current_question_index != catalog.len() {
            return Err(StateInvariantError::FinishedBeforeEnd {
                index: next.current_question_index,
                catalog_len: catalog.len(),
            });
        }

        *self = next;
        Ok(())
    }
}

/// A partial update produced by one step.
///
/// `None` leaves a field untouched. For nullable fields the inner `Option`
/// is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnUpdate {
    pub current_question_index: Option<usize>,
    pub current_followup_count: Option<u32>,
    pub raw_answer: Option<Option<String>>,
    pub translated_answer: Option<Option<String>>,
    pub normalized_answer: Option<Option<String>>,
    pub was_translated: Option<bool>,
    pub classification: Option<Option<Classification>>,
    pub needs_reprompt: Option<bool>,
    pub reprompt_reason: Option<Option<String>>,
    pub draft: Option<Option<AnswerDraft>>,
    /// Appended to the response list
    pub stored_response: Option<StoredResponse>,
    pub started_at: Option<DateTime<Utc>>,
    pub is_finished: Option<bool>,
    pub final_transcript: Option<FinalTranscript>,
}

impl TurnUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every per-turn scratch field.
    pub fn clear_scratch(mut self) -> Self {
        self.raw_answer = Some(None);
        self.translated_answer = Some(None);
        self.normalized_answer = Some(None);
        self.was_translated = Some(false);
        self.classification = Some(None);
        self.needs_reprompt = Some(false);
        self.reprompt_reason = Some(None);
        self
    }
}
