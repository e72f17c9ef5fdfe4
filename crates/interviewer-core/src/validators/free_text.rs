//! Short and long free-text answers.

use super::{FormatValidator, ValidationOutcome};

/// Accepts any answer with non-whitespace content, normalized by trimming.
pub struct FreeTextValidator;

impl FreeTextValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FreeTextValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatValidator for FreeTextValidator {
    fn validate(&self, input: &str) -> ValidationOutcome {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            ValidationOutcome::rejected("Please share an answer before we continue.")
        } else {
            ValidationOutcome::accepted(trimmed)
        }
    }
}
