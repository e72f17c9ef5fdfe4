//! Single choice from a fixed option list.
//!
//! Matching strategies are tried in order and the first hit wins:
//! 1. exact (case-insensitive)
//! 2. prefix in either direction
//! 3. substring containment in either direction
//! 4. 1-based number or single letter index

use super::{FormatValidator, ValidationOutcome};

/// Resolves an answer to one of the configured options.
pub struct SingleSelectValidator<'a> {
    options: &'a [String],
}

impl<'a> SingleSelectValidator<'a> {
    pub fn new(options: &'a [String]) -> Self {
        Self { options }
    }

    /// Find the option index an answer refers to.
    pub fn resolve(&self, input: &str) -> Option<usize> {
        let answer = input.trim().to_lowercase();
        if answer.is_empty() {
            return None;
        }

        let lowered: Vec<String> = self.options.iter().map(|o| o.to_lowercase()).collect();

        lowered
            .iter()
            .position(|option| *option == answer)
            .or_else(|| {
                lowered
                    .iter()
                    .position(|option| option.starts_with(&answer) || answer.starts_with(option.as_str()))
            })
            .or_else(|| {
                lowered
                    .iter()
                    .position(|option| option.contains(&answer) || answer.contains(option.as_str()))
            })
            .or_else(|| self.resolve_index(&answer))
    }

    fn resolve_index(&self, answer: &str) -> Option<usize> {
        let count = self.options.len();

        if let Ok(n) = answer.parse::<usize>() {
            return (1..=count).contains(&n).then(|| n - 1);
        }

        let mut chars = answer.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) if letter.is_ascii_lowercase() => {
                let index = (letter as u8 - b'a') as usize;
                (index < count).then_some(index)
            }
            _ => None,
        }
    }
}

impl FormatValidator for SingleSelectValidator<'_> {
    fn validate(&self, input: &str) -> ValidationOutcome {
        match self.resolve(input) {
            Some(index) => ValidationOutcome::accepted(self.options[index].clone()),
            None => ValidationOutcome::rejected(format!(
                "Please choose one of: {}.",
                self.options.join(", ")
            )),
        }
    }
}
