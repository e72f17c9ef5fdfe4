//! # interviewer-core
//!
//! Deterministic turn-state machine for structured interviews.
//!
//! This crate holds everything about an interview that does not need a
//! language service:
//! - The question catalog and its fail-fast configuration checks
//! - Per-kind answer format validators
//! - The persistent turn state and its progress invariants
//! - The router that picks the next step after each step
//! - The final transcript model
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Routing is a pure function of step, state and catalog
//! 2. **No network calls**: Classification and generation live in `interviewer-runtime`
//! 3. **Monotonic**: The question index never decreases, logs only grow
//! 4. **Bounded**: Follow-ups never exceed a question's `max_followups`
//!
//! ## Example
//!
//! ```rust,ignore
//! use interviewer_core::{route_after, route_entry, InterviewConfig, TurnState};
//!
//! let config = InterviewConfig::from_yaml_file("screener.yaml")?;
//! config.validate()?;
//!
//! let state = TurnState::new();
//! let first = route_entry(&state)?;
//! let next = route_after(first, &state, &config.questions)?;
//! ```

pub mod catalog;
pub mod router;
pub mod state;
pub mod transcript;
pub mod validators;

// Re-export main types at crate root
pub use catalog::{ConfigError, InterviewConfig, InterviewKind, Question, QuestionKind};
pub use router::{route_after, route_entry, Step, Transition};
pub use state::{
    AnswerDraft, Classification, ConcernKind, FollowupExchange, Message, Role, StateInvariantError,
    StoredResponse, TurnState, TurnUpdate,
};
pub use transcript::{FinalTranscript, TranscriptBuilder, TranscriptEntry};
pub use validators::{validate_answer, validator_for, FormatValidator, ValidationOutcome};
