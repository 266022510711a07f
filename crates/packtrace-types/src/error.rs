use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid trade item number: {0}")]
    InvalidGtin(String),

    #[error("check digit mismatch: expected {expected}, got {actual}")]
    CheckDigit { expected: char, actual: char },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid expiry date: {0}")]
    InvalidDate(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("channel identifier must not be empty")]
    EmptyChannel,
}
