use thiserror::Error;

/// Errors produced by structured-code encoding and decoding.
///
/// All of these are validation errors: local, non-retryable, and safe to
/// surface as a reason code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid trade item number: {0}")]
    InvalidIdentifier(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid expiry date: {0}")]
    InvalidDate(String),

    #[error("malformed code: {0}")]
    MalformedCode(String),

    #[error("check digit mismatch: expected {expected}, got {actual}")]
    ChecksumFailed { expected: char, actual: char },
}

impl CodecError {
    /// Stable reason code for caller-facing results. Raw diagnostics stay
    /// internal.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "InvalidIdentifier",
            Self::InvalidField { .. } => "InvalidField",
            Self::InvalidDate(_) => "InvalidDate",
            Self::MalformedCode(_) => "MalformedCode",
            Self::ChecksumFailed { .. } => "ChecksumFailed",
        }
    }
}
