//! Per-kind answer format validators.
//!
//! Every validator is pure and synchronous. A failed validation is not an
//! error: the outcome carries a user-facing message and the engine reprompts.
//!
//! Kinds without a dedicated validator (short/long answers and unrecognized
//! kinds) fall back to [`FreeTextValidator`].

mod free_text;
mod number_scale;
mod phone_number;
mod single_select;
mod yes_no;

pub use free_text::FreeTextValidator;
pub use number_scale::{NumberScaleValidator, SCALE_MAX, SCALE_MIN};
pub use phone_number::PhoneNumberValidator;
pub use single_select::SingleSelectValidator;
pub use yes_no::YesNoValidator;

use serde::{Deserialize, Serialize};

use crate::catalog::{Question, QuestionKind};

/// Result of validating one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,

    /// Canonical form of the answer when valid
    pub normalized_value: Option<String>,

    /// Message explaining a rejection, shown on reprompt
    pub error_message: Option<String>,
}

impl ValidationOutcome {
    pub fn accepted(normalized: impl Into<String>) -> Self {
        Self {
            valid: true,
            normalized_value: Some(normalized.into()),
            error_message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            normalized_value: None,
            error_message: Some(message.into()),
        }
    }
}

/// A format check for one question kind.
pub trait FormatValidator {
    /// Validate and normalize a raw answer.
    fn validate(&self, input: &str) -> ValidationOutcome;
}

/// Select the validator for a question.
pub fn validator_for(question: &Question) -> Box<dyn FormatValidator + '_> {
    match &question.kind {
        QuestionKind::NumberScale => Box::new(NumberScaleValidator::new()),
        QuestionKind::YesNo => Box::new(YesNoValidator::new()),
        QuestionKind::SingleSelect => Box::new(SingleSelectValidator::new(question.options())),
        QuestionKind::PhoneNumber => Box::new(PhoneNumberValidator::new()),
        QuestionKind::ShortAnswer | QuestionKind::LongAnswer | QuestionKind::Unrecognized(_) => {
            Box::new(FreeTextValidator::new())
        }
    }
}

/// Validate an answer against its question's kind.
pub fn validate_answer(question: &Question, input: &str) -> ValidationOutcome {
    validator_for(question).validate(input)
}
