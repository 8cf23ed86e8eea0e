//! Field-level validation errors and binding failures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    /// A required field is unset.
    Required,
    /// The value has the wrong JSON kind for the declared field.
    Type,
    /// An integer is outside its declared bounds.
    Range,
    /// A string that must not be empty is empty.
    NonEmpty,
    /// A string is not one of the allowed values.
    OneOf,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "REQUIRED",
            Rule::Type => "TYPE",
            Rule::Range => "RANGE",
            Rule::NonEmpty => "NON_EMPTY",
            Rule::OneOf => "ONE_OF",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (`db.port`), `(root)` for the document itself.
    pub path: String,
    pub rule: Rule,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule,
            message: message.into(),
        }
    }

    /// Machine-readable form, e.g. `RANGE:db.port`.
    pub fn to_code(&self) -> String {
        format!("{}:{}", self.rule, self.path)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Join field errors into a single line.
pub fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure converting between plain documents and typed values.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("document does not match schema: {}", join_field_errors(.0))]
    Invalid(Vec<FieldError>),

    #[error("failed to convert document: {0}")]
    Convert(#[from] serde_json::Error),
}
