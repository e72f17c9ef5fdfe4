//! Question records and kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The answer format a question expects.
///
/// Deserializes from any string so that unknown kinds reach the config
/// validator as [`QuestionKind::Unrecognized`] instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionKind {
    NumberScale,
    LongAnswer,
    ShortAnswer,
    YesNo,
    SingleSelect,
    PhoneNumber,
    /// A kind outside the closed set. Rejected by config validation,
    /// validated as free text if it ever reaches a validator.
    Unrecognized(String),
}

impl QuestionKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NumberScale => "number_scale",
            Self::LongAnswer => "long_answer",
            Self::ShortAnswer => "short_answer",
            Self::YesNo => "yes_no",
            Self::SingleSelect => "single_select",
            Self::PhoneNumber => "phone_number",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for QuestionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "number_scale" => Self::NumberScale,
            "long_answer" => Self::LongAnswer,
            "short_answer" => Self::ShortAnswer,
            "yes_no" => Self::YesNo,
            "single_select" => Self::SingleSelect,
            "phone_number" => Self::PhoneNumber,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<QuestionKind> for String {
    fn from(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// Expected answer format
    pub kind: QuestionKind,

    /// Prompt shown to the interviewee
    pub text: String,

    /// Upper bound on generated follow-ups for this question
    #[serde(default)]
    pub max_followups: u32,

    /// Optional section label (e.g. "contact", "experience")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Choices, required for single_select
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Question {
    pub fn new(kind: QuestionKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            max_followups: 0,
            group: None,
            options: None,
        }
    }

    pub fn with_max_followups(mut self, max_followups: u32) -> Self {
        self.max_followups = max_followups;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Options as a slice; empty when none are configured.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Assessment questions are classified and may receive follow-ups.
    /// Basic questions (`max_followups == 0`) are only format-validated.
    pub fn is_assessment(&self) -> bool {
        self.max_followups > 0
    }
}
