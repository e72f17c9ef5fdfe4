//! 1–10 rating scale.

use super::{FormatValidator, ValidationOutcome};

pub const SCALE_MIN: i64 = 1;
pub const SCALE_MAX: i64 = 10;

/// Accepts an integer in `[1, 10]`, normalized to its canonical decimal form.
pub struct NumberScaleValidator;

impl NumberScaleValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NumberScaleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatValidator for NumberScaleValidator {
    fn validate(&self, input: &str) -> ValidationOutcome {
        match input.trim().parse::<i64>() {
            Ok(n) if (SCALE_MIN..=SCALE_MAX).contains(&n) => ValidationOutcome::accepted(n.to_string()),
            Ok(_) => ValidationOutcome::rejected(format!(
                "Please choose a number between {} and {}.",
                SCALE_MIN, SCALE_MAX
            )),
            Err(_) => ValidationOutcome::rejected(format!(
                "Please answer with a whole number from {} to {}.",
                SCALE_MIN, SCALE_MAX
            )),
        }
    }
}
