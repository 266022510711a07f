use thiserror::Error;

/// Errors produced by log reading and cursor handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid cursor token: {0}")]
    InvalidCursor(String),

    #[error("page limit must be at least 1")]
    InvalidLimit,

    #[error("log unreachable: {0}")]
    Unreachable(String),

    #[error("malformed page from log: {0}")]
    MalformedPage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
