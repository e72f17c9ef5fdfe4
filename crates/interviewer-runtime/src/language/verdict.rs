//! Classification verdict parsing.
//!
//! Replies are parsed strictly: a fenced ```json block, or the first `{...}`
//! span, must deserialize into the expected verdict. Anything else is
//! malformed and the caller falls back to the safe default. There is no
//! best-effort reading of prose.

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use interviewer_core::{Classification, ConcernKind};

use super::ServiceError;

lazy_static! {
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
    static ref BARE_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Reply shape for concern detection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcernVerdict {
    pub has_concern: bool,

    /// Free label, mapped onto [`ConcernKind`]
    #[serde(default)]
    pub concern_kind: Option<String>,

    #[serde(default)]
    pub concern_detail: Option<String>,
}

impl ConcernVerdict {
    /// No concern.
    pub fn none() -> Self {
        Self {
            has_concern: false,
            concern_kind: None,
            concern_detail: None,
        }
    }

    /// Category of the concern, if one was raised. Unknown labels become
    /// [`ConcernKind::Other`] so a flagged answer is never silently cleared.
    pub fn kind(&self) -> Option<ConcernKind> {
        if !self.has_concern {
            return None;
        }
        let label = self
            .concern_kind
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .replace(|c: char| c == ' ' || c == '-', "_");

        let kind = match label.as_str() {
            "sensitive_disclosure" => ConcernKind::SensitiveDisclosure,
            "off_topic" => ConcernKind::OffTopic,
            "reportable_incident" => ConcernKind::ReportableIncident,
            _ => ConcernKind::Other,
        };
        Some(kind)
    }
}

/// Reply shape for the completeness check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletenessVerdict {
    pub is_complete_answer: bool,

    #[serde(default)]
    pub needs_more_context: bool,
}

impl CompletenessVerdict {
    /// Complete: the safe default, so a broken check never causes probing.
    pub fn complete() -> Self {
        Self {
            is_complete_answer: true,
            needs_more_context: false,
        }
    }
}

/// Merge the two concurrent verdicts into one classification.
pub fn combine(concern: ConcernVerdict, completeness: CompletenessVerdict) -> Classification {
    Classification {
        has_concern: concern.has_concern,
        concern_kind: concern.kind(),
        concern_detail: concern.concern_detail.filter(|_| concern.has_concern),
        is_complete_answer: completeness.is_complete_answer,
        needs_more_context: completeness.needs_more_context,
    }
}

/// Locate the JSON object in a reply.
pub fn extract_json(reply: &str) -> Option<&str> {
    if let Some(captures) = FENCED_JSON.captures(reply) {
        return captures.get(1).map(|m| m.as_str());
    }
    BARE_OBJECT.find(reply).map(|m| m.as_str())
}

/// Parse a verdict from a raw reply.
pub fn parse<T: DeserializeOwned>(reply: &str) -> Result<T, ServiceError> {
    let json = extract_json(reply)
        .ok_or_else(|| ServiceError::Malformed("no JSON object in reply".to_string()))?;
    serde_json::from_str(json).map_err(|e| ServiceError::Malformed(e.to_string()))
}
