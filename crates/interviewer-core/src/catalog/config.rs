//! Interview configuration parsing and fail-fast validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::question::{Question, QuestionKind};

/// Errors that can occur when loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration at {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Which interview script is being run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterviewKind {
    Screener,
    Exit,
    Unrecognized(String),
}

impl InterviewKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Screener => "screener",
            Self::Exit => "exit",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for InterviewKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "screener" => Self::Screener,
            "exit" => Self::Exit,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<InterviewKind> for String {
    fn from(kind: InterviewKind) -> Self {
        match kind {
            InterviewKind::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for InterviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The interview definition: kind, ordered catalog and offline flag.
///
/// Parsing never validates. [`InterviewConfig::validate`] runs once, when the
/// interview is initialized, and reports only the first violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewConfig {
    pub interview_kind: InterviewKind,

    #[serde(default)]
    pub questions: Vec<Question>,

    /// Bypass every language service call in favour of canned text and defaults
    #[serde(default)]
    pub offline_mode: bool,
}

impl InterviewConfig {
    pub fn new(interview_kind: InterviewKind, questions: Vec<Question>) -> Self {
        Self {
            interview_kind,
            questions,
            offline_mode: false,
        }
    }

    pub fn offline(mut self, offline_mode: bool) -> Self {
        self.offline_mode = offline_mode;
        self
    }

    /// Parse a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load by file extension: `.json` is JSON, anything else YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }

    /// Fail-fast validation. Returns the first violation found, in order:
    /// interview kind, non-empty catalog, then per question text, kind and
    /// select options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let InterviewKind::Unrecognized(raw) = &self.interview_kind {
            return Err(ConfigError::invalid(
                "interview_kind",
                format!("must be \"screener\" or \"exit\", got \"{}\"", raw),
            ));
        }

        if self.questions.is_empty() {
            return Err(ConfigError::invalid(
                "questions",
                "at least one question is required",
            ));
        }

        for (index, question) in self.questions.iter().enumerate() {
            Self::validate_question(index, question)?;
        }

        Ok(())
    }

    fn validate_question(index: usize, question: &Question) -> Result<(), ConfigError> {
        let field = |name: &str| format!("questions[{}].{}", index, name);

        if question.text.trim().is_empty() {
            return Err(ConfigError::invalid(field("text"), "must not be empty"));
        }

        if let QuestionKind::Unrecognized(raw) = &question.kind {
            return Err(ConfigError::invalid(
                field("kind"),
                format!("unrecognized question kind \"{}\"", raw),
            ));
        }

        // max_followups is unsigned; negative or fractional values fail at parse time.

        if question.kind == QuestionKind::SingleSelect && question.options().is_empty() {
            return Err(ConfigError::invalid(
                field("options"),
                "single_select questions require at least one option",
            ));
        }

        Ok(())
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
