//! Phone numbers, reduced to their digits.

use lazy_static::lazy_static;
use regex::Regex;

use super::{FormatValidator, ValidationOutcome};

lazy_static! {
    static ref NON_DIGIT: Regex = Regex::new(r"\D").unwrap();
}

const NATIONAL_LENGTH: usize = 10;
const INTERNATIONAL_MIN: usize = 7;
const INTERNATIONAL_MAX: usize = 15;

/// Accepts 10-digit national numbers, 11-digit numbers with a leading `1`
/// country code (stripped), or 7–15 digit international numbers.
pub struct PhoneNumberValidator;

impl PhoneNumberValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneNumberValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatValidator for PhoneNumberValidator {
    fn validate(&self, input: &str) -> ValidationOutcome {
        let digits = NON_DIGIT.replace_all(input, "");

        match digits.len() {
            NATIONAL_LENGTH => ValidationOutcome::accepted(digits),
            11 if digits.starts_with('1') => ValidationOutcome::accepted(&digits[1..]),
            INTERNATIONAL_MIN..=INTERNATIONAL_MAX => ValidationOutcome::accepted(digits),
            _ => ValidationOutcome::rejected(
                "Please enter a valid phone number, including the area code.",
            ),
        }
    }
}
