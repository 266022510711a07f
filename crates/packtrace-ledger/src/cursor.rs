use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

const CURSOR_VERSION: u8 = 1;

/// Direction of a timeline scan, keyed on sequence number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanOrder {
    #[default]
    Ascending,
    Descending,
}

impl ScanOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for ScanOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resumable position in a channel's paginated event stream.
///
/// A cursor encodes the last sequence number consumed in the requested
/// direction — an absolute position, never an array offset — so it stays
/// valid while new entries are appended at higher sequence numbers.
/// The token form is opaque to callers and versioned so stale clients are
/// rejected cleanly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub last_seq: u64,
    pub order: ScanOrder,
}

impl Cursor {
    pub fn new(last_seq: u64, order: ScanOrder) -> Self {
        Self { last_seq, order }
    }

    /// Encode as an opaque token: version byte + bincode payload, hex.
    pub fn token(&self) -> Result<String, LedgerError> {
        let payload =
            bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(CURSOR_VERSION);
        bytes.extend_from_slice(&payload);
        Ok(hex::encode(bytes))
    }

    /// Decode an opaque token produced by [`Cursor::token`].
    pub fn parse(token: &str) -> Result<Self, LedgerError> {
        let bytes =
            hex::decode(token).map_err(|e| LedgerError::InvalidCursor(e.to_string()))?;
        let (&version, payload) = bytes
            .split_first()
            .ok_or_else(|| LedgerError::InvalidCursor("empty token".into()))?;
        if version != CURSOR_VERSION {
            return Err(LedgerError::InvalidCursor(format!(
                "unsupported version {version}"
            )));
        }
        bincode::deserialize(payload).map_err(|e| LedgerError::InvalidCursor(e.to_string()))
    }
}
