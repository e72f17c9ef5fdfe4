//! Yes/no answers matched against closed synonym sets.

use lazy_static::lazy_static;
use std::collections::HashSet;

use super::{FormatValidator, ValidationOutcome};

lazy_static! {
    static ref YES_WORDS: HashSet<&'static str> = [
        "yes", "y", "yeah", "yep", "yup", "sure", "absolutely",
        "definitely", "correct", "affirmative", "true",
    ]
    .into_iter()
    .collect();

    static ref NO_WORDS: HashSet<&'static str> = [
        "no", "n", "nope", "nah", "negative", "not really", "false",
    ]
    .into_iter()
    .collect();
}

/// Normalizes yes-like answers to `"yes"` and no-like answers to `"no"`.
pub struct YesNoValidator;

impl YesNoValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YesNoValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatValidator for YesNoValidator {
    fn validate(&self, input: &str) -> ValidationOutcome {
        let answer = input.trim().to_lowercase();

        if YES_WORDS.contains(answer.as_str()) {
            ValidationOutcome::accepted("yes")
        } else if NO_WORDS.contains(answer.as_str()) {
            ValidationOutcome::accepted("no")
        } else {
            ValidationOutcome::rejected("Please answer yes or no.")
        }
    }
}
