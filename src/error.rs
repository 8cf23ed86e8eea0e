//! Error types for configuration loading, merging and persistence.

use cfglayer_schema::{join_field_errors, BindError, FieldError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::encoding::Encoding;

/// Stable discriminants for [`ConfigError`], suitable for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Primary (and fallback) file could not be read.
    LoadFailure,
    /// File content is not valid JSON.
    ParseFailure,
    /// A value violates the schema.
    ValidationFailure,
    /// Override file sets no schema field.
    EmptyOverrides,
    /// Persisting overrides to disk failed.
    PersistFailure,
    /// A value could not be converted between typed and plain form.
    ConversionFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::LoadFailure => "LOAD_FAILURE",
            ErrorCode::ParseFailure => "PARSE_FAILURE",
            ErrorCode::ValidationFailure => "VALIDATION_FAILURE",
            ErrorCode::EmptyOverrides => "EMPTY_OVERRIDES",
            ErrorCode::PersistFailure => "PERSIST_FAILURE",
            ErrorCode::ConversionFailure => "CONVERSION_FAILURE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure touching a single configuration file.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("unsupported file extension for {}: only '.{expected}' files are supported", .path.display())]
    UnsupportedExtension { path: PathBuf, expected: &'static str },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid {encoding}: {reason}", .path.display())]
    Encoding {
        path: PathBuf,
        encoding: Encoding,
        reason: String,
    },
}

impl FileError {
    /// True when the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}", describe_load_failure(.primary, .fallback.as_ref()))]
    LoadFailure {
        #[source]
        primary: FileError,
        fallback: Option<FileError>,
    },

    #[error("failed to parse {origin}: {source}")]
    ParseFailure {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration validation failed: {}", join_field_errors(.0))]
    ValidationFailure(Vec<FieldError>),

    #[error("override file {} contributes no configuration fields", .0.display())]
    EmptyOverrides(PathBuf),

    #[error("failed to persist overrides: {0}")]
    PersistFailure(#[source] FileError),

    #[error("failed to convert {context}: {source}")]
    ConversionFailure {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn describe_load_failure(primary: &FileError, fallback: Option<&FileError>) -> String {
    match fallback {
        Some(fallback) => format!(
            "failed to load configuration: {}; fallback also failed: {}",
            primary, fallback
        ),
        None => format!("failed to load configuration: {}", primary),
    }
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::LoadFailure { .. } => ErrorCode::LoadFailure,
            ConfigError::ParseFailure { .. } => ErrorCode::ParseFailure,
            ConfigError::ValidationFailure(_) => ErrorCode::ValidationFailure,
            ConfigError::EmptyOverrides(_) => ErrorCode::EmptyOverrides,
            ConfigError::PersistFailure(_) => ErrorCode::PersistFailure,
            ConfigError::ConversionFailure { .. } => ErrorCode::ConversionFailure,
        }
    }

    /// Field errors carried by a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ConfigError::ValidationFailure(errors) => errors,
            _ => &[],
        }
    }
}

impl From<BindError> for ConfigError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::Invalid(errors) => ConfigError::ValidationFailure(errors),
            BindError::Convert(source) => ConfigError::ConversionFailure {
                context: "configuration value",
                source,
            },
        }
    }
}
