//! Final transcript assembly.
//!
//! The transcript is built once, at finish, from the turn state and the
//! closing message. The closing message is always the last log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::InterviewKind;
use crate::state::{Message, Role, StateInvariantError, StoredResponse, TurnState};

/// One role-tagged entry of the flattened conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for TranscriptEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// The structured record of a completed interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalTranscript {
    pub interview_kind: InterviewKind,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub question_count: usize,
    pub questions_answered: usize,
    pub concerns_detected: usize,
    pub responses: Vec<StoredResponse>,
    pub full_log: Vec<TranscriptEntry>,
}

/// Builds a [`FinalTranscript`] from a finished turn state.
pub struct TranscriptBuilder {
    interview_kind: InterviewKind,
    question_count: usize,
}

impl TranscriptBuilder {
    pub fn new(interview_kind: InterviewKind, question_count: usize) -> Self {
        Self {
            interview_kind,
            question_count,
        }
    }

    /// Assemble the transcript.
    ///
    /// `closing` is appended after the existing log; it must not already be
    /// part of `state.message_log`.
    pub fn build(
        &self,
        state: &TurnState,
        closing: &Message,
        completed_at: DateTime<Utc>,
    ) -> Result<FinalTranscript, StateInvariantError> {
        if state.final_transcript.is_some() {
            return Err(StateInvariantError::TranscriptAlreadySet);
        }

        let started_at = state
            .started_at
            .ok_or(StateInvariantError::MissingField("started_at"))?;

        let full_log = state
            .message_log
            .iter()
            .chain(std::iter::once(closing))
            .map(TranscriptEntry::from)
            .collect();

        Ok(FinalTranscript {
            interview_kind: self.interview_kind.clone(),
            started_at,
            completed_at,
            question_count: self.question_count,
            questions_answered: state.responses.iter().filter(|r| !r.was_skipped).count(),
            concerns_detected: state.concern_count(),
            responses: state.responses.clone(),
            full_log,
        })
    }
}
