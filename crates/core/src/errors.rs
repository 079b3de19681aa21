use serde::Serialize;
use thiserror::Error;

/// Coarse category attached to `INTERNAL_ERROR` envelopes as `details.type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// A record was present but could not be read as the expected shape.
    MalformedRecord,
    /// The report could not be rendered.
    Serialization,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedRecord => "MalformedRecord",
            Self::Serialization => "Serialization",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),
    #[error("Missing required field: {field}")]
    MissingField { field: String },
    #[error("{message}")]
    Internal { kind: FailureKind, message: String },
}

impl AnalysisError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Internal { kind: FailureKind::MalformedRecord, message: message.into() }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::MissingField { .. } => ErrorCode::MissingField,
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    MissingField,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::MissingField => "MISSING_FIELD",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// The `{"error": {...}}` object handed back to the caller on failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    #[serde(rename = "type")]
    pub kind: FailureKind,
}

impl From<AnalysisError> for ErrorEnvelope {
    fn from(value: AnalysisError) -> Self {
        let code = value.code();
        let message = value.to_string();
        let body = match value {
            AnalysisError::Validation(_) => {
                ErrorBody { code, message, field: None, details: None }
            }
            AnalysisError::MissingField { field } => {
                ErrorBody { code, message, field: Some(field), details: None }
            }
            AnalysisError::Internal { kind, .. } => {
                ErrorBody { code, message, field: None, details: Some(ErrorDetails { kind }) }
            }
        };
        Self { error: body }
    }
}
