use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Validated 14-digit Global Trade Item Number.
///
/// A `Gtin` always holds exactly 14 ASCII digits whose final digit is the
/// correct GS1 modulo-10 check digit. Construction is the only way to obtain
/// one, so downstream code can rely on the invariant without re-checking.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gtin(String);

impl Gtin {
    /// Parse and validate a 14-digit trade item number.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        if raw.len() != 14 {
            return Err(TypeError::InvalidGtin(format!(
                "expected 14 digits, got {}",
                raw.len()
            )));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidGtin("non-digit character".into()));
        }

        let expected = mod10_check_digit(&raw.as_bytes()[..13]);
        let actual = raw.as_bytes()[13] - b'0';
        if expected != actual {
            return Err(TypeError::CheckDigit {
                expected: (expected + b'0') as char,
                actual: (actual + b'0') as char,
            });
        }

        Ok(Self(raw.to_string()))
    }

    /// Build a `Gtin` from a 13-digit body by computing the check digit.
    ///
    /// Provisioning helper: batch registration holds the item reference and
    /// derives the full number from it.
    pub fn with_check_digit(body: &str) -> Result<Self, TypeError> {
        if body.len() != 13 || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidGtin(
                "check digit body must be 13 digits".into(),
            ));
        }
        let check = mod10_check_digit(body.as_bytes());
        Ok(Self(format!("{body}{}", check)))
    }

    /// The 14 digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The check digit (last digit).
    pub fn check_digit(&self) -> u8 {
        self.0.as_bytes()[13] - b'0'
    }
}

/// GS1 modulo-10 check digit over the data digits (check digit excluded).
///
/// Weights alternate 3, 1, 3, ... starting from the digit adjacent to the
/// check digit and moving left.
pub(crate) fn mod10_check_digit(data: &[u8]) -> u8 {
    let mut sum = 0u32;
    for (i, b) in data.iter().rev().enumerate() {
        let digit = (b - b'0') as u32;
        let weight = if i % 2 == 0 { 3 } else { 1 };
        sum += digit * weight;
    }
    ((10 - (sum % 10)) % 10) as u8
}

impl fmt::Debug for Gtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gtin({})", self.0)
    }
}

impl fmt::Display for Gtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
