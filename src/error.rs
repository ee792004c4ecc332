use crate::enums::RejectionKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed message reported when a body rule set meets an empty or unparsable body.
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Fixed message reported when a form rule set meets a body with no fields.
pub const INVALID_FORM_MESSAGE: &str = "Invalid form data";

/// Produced by the enforcement pipeline when a request fails a rule.
///
/// Only the first failure of a request is ever reported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct Rejection {
    pub kind: RejectionKind,
    /// Rule key that failed; `None` for structural body/form failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Rejection {
    pub fn missing_body() -> Self {
        Self {
            kind: RejectionKind::MissingBody,
            field: None,
            message: INVALID_BODY_MESSAGE.to_string(),
        }
    }

    pub fn missing_form_data() -> Self {
        Self {
            kind: RejectionKind::MissingFormData,
            field: None,
            message: INVALID_FORM_MESSAGE.to_string(),
        }
    }

    /// A required field resolved to an empty value.
    ///
    /// `message` is the rule's override; without one the standard text is used.
    pub fn required(key: &str, message: Option<&str>) -> Self {
        Self {
            kind: RejectionKind::Required,
            field: Some(key.to_string()),
            message: message
                .map(str::to_string)
                .unwrap_or_else(|| format!("Invalid {key} input. Cause: it is required.")),
        }
    }

    pub fn predicate(key: &str, message: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::PredicateFailed,
            field: Some(key.to_string()),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Serialization error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SerializeError {
    pub message: String,
}
