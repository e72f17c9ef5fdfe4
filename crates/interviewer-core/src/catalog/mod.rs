//! Question catalog and interview configuration.
//!
//! The catalog is an immutable ordered list of questions set once when an
//! interview starts. Configs are plain data loaded from YAML or JSON and
//! validated fail-fast before the first question is asked.

mod config;
mod question;

pub use config::{ConfigError, InterviewConfig, InterviewKind};
pub use question::{Question, QuestionKind};
