use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// FNC1 group separator that delimits variable-length fields in a
/// structured code. Code fields must never contain it.
pub const GROUP_SEPARATOR: char = '\u{1D}';

const MAX_FIELD_LEN: usize = 20;

fn validate_code_field(field: &'static str, raw: &str) -> Result<(), TypeError> {
    if raw.is_empty() {
        return Err(TypeError::InvalidField {
            field,
            reason: "must not be empty".into(),
        });
    }
    if raw.len() > MAX_FIELD_LEN {
        return Err(TypeError::InvalidField {
            field,
            reason: format!("longer than {MAX_FIELD_LEN} characters"),
        });
    }
    if raw.contains(GROUP_SEPARATOR) {
        return Err(TypeError::InvalidField {
            field,
            reason: "contains the group separator".into(),
        });
    }
    if !raw.chars().all(|c| c.is_ascii_graphic()) {
        return Err(TypeError::InvalidField {
            field,
            reason: "contains non-printable or non-ASCII characters".into(),
        });
    }
    Ok(())
}

/// Batch/lot code printed on the pack (AI 10).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotCode(String);

impl LotCode {
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        validate_code_field("lot", raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for LotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LotCode({})", self.0)
    }
}

impl fmt::Display for LotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-pack serial number (AI 21).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        validate_code_field("serial", raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerialNumber({})", self.0)
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
