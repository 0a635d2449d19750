//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use std::fmt;

use aiden_osint_core::CoreError;
use aiden_osint_llm::LlmError;
use aiden_osint_tools::ToolError;
use serde::Serialize;
use thiserror::Error;

/// Why the oracle's structured answer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    /// The oracle returned no text
    Empty,
    /// The text is not a JSON object
    Malformed,
    /// A required field is absent or blank
    MissingField,
    /// A score lies outside [1, 10]
    OutOfRange,
    /// risk_level is not Low, Medium, High or Critical
    InvalidRiskLevel,
    /// The oracle call itself failed
    Oracle,
}

impl ExtractionErrorKind {
    /// Stable lowercase tag used in error responses.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Malformed => "malformed",
            Self::MissingField => "missing_field",
            Self::OutOfRange => "out_of_range",
            Self::InvalidRiskLevel => "invalid_risk_level",
            Self::Oracle => "oracle",
        }
    }
}

impl fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Structured-output validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ExtractionError {
    pub kind: ExtractionErrorKind,
    pub message: String,
}

impl ExtractionError {
    pub fn new(kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(ExtractionErrorKind::Empty, "oracle returned an empty response")
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorKind::Malformed, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ExtractionErrorKind::MissingField,
            format!("field '{}' is missing or empty", field),
        )
    }

    pub fn out_of_range(field: &str, value: i64) -> Self {
        Self::new(
            ExtractionErrorKind::OutOfRange,
            format!("field '{}' must be between 1 and 10, got {}", field, value),
        )
    }

    pub fn invalid_risk_level(value: &str) -> Self {
        Self::new(
            ExtractionErrorKind::InvalidRiskLevel,
            format!(
                "risk_level must be one of Low, Medium, High, Critical; got '{}'",
                value
            ),
        )
    }

    pub fn oracle(err: &LlmError) -> Self {
        Self::new(ExtractionErrorKind::Oracle, err.to_string())
    }
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Oracle transport or protocol errors
    #[error("Oracle error: {0}")]
    Llm(#[from] LlmError),

    /// The agent loop could not produce findings
    #[error("Orchestration error: {0}")]
    Orchestration(String),

    /// The oracle's structured answer was rejected.
    ///
    /// Carries whatever raw findings were gathered before the failure.
    #[error("Extraction error ({}): {}", .error.kind, .error.message)]
    Extraction {
        error: ExtractionError,
        raw_results: Option<String>,
    },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an orchestration error
    pub fn orchestration(msg: impl Into<String>) -> Self {
        Self::Orchestration(msg.into())
    }

    /// The session was cancelled by its caller
    pub fn cancelled() -> Self {
        Self::Orchestration("cancelled".to_string())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Attach partial findings to an extraction error; other variants are
    /// returned unchanged.
    pub fn with_raw_results(self, raw: impl Into<String>) -> Self {
        match self {
            Self::Extraction { error, .. } => Self::Extraction {
                error,
                raw_results: Some(raw.into()),
            },
            other => other,
        }
    }

    /// Partial findings carried by this error, if any
    pub fn raw_results(&self) -> Option<&str> {
        match self {
            Self::Extraction { raw_results, .. } => raw_results.as_deref(),
            _ => None,
        }
    }

    /// Stable machine-readable tag for error responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::Llm(_) => "oracle",
            Self::Orchestration(_) => "orchestration",
            Self::Extraction { error, .. } => error.kind.tag(),
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(error: ExtractionError) -> Self {
        Self::Extraction {
            error,
            raw_results: None,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => Self::Config(msg),
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Io(e) => Self::Io(e),
            CoreError::Serialization(e) => Self::Serialization(e),
            CoreError::NotFound(msg) => Self::Internal(format!("Not found: {}", msg)),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<ToolError> for AppError {
    fn from(err: ToolError) -> Self {
        Self::Config(err.to_string())
    }
}
