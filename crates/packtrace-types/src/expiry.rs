use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Expiry date of a batch, carried on the code as a 6-digit YYMMDD segment.
///
/// The two-digit year maps to the 2000-2099 window. Dates before the
/// window are rejected so a mistyped year cannot produce a
/// plausible-looking code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpiryDate(NaiveDate);

impl ExpiryDate {
    /// Earliest representable expiry date.
    pub const MIN_YEAR: i32 = 2000;
    /// Latest representable expiry date year (two-digit window).
    pub const MAX_YEAR: i32 = 2099;

    /// Build from calendar components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, TypeError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(TypeError::InvalidDate(format!(
                "year {year} outside {}..={}",
                Self::MIN_YEAR,
                Self::MAX_YEAR
            )));
        }
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            TypeError::InvalidDate(format!("{year:04}-{month:02}-{day:02} is not a calendar date"))
        })?;
        Ok(Self(date))
    }

    /// Parse the 6-digit YYMMDD wire segment.
    pub fn parse_yymmdd(segment: &str) -> Result<Self, TypeError> {
        if segment.len() != 6 || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidDate(format!(
                "expected 6 digits, got {segment:?}"
            )));
        }
        let yy: i32 = segment[0..2].parse().unwrap_or_default();
        let mm: u32 = segment[2..4].parse().unwrap_or_default();
        let dd: u32 = segment[4..6].parse().unwrap_or_default();
        Self::from_ymd(Self::MIN_YEAR + yy, mm, dd)
    }

    /// The 6-digit YYMMDD wire form.
    pub fn yymmdd(&self) -> String {
        format!(
            "{:02}{:02}{:02}",
            self.0.year() - Self::MIN_YEAR,
            self.0.month(),
            self.0.day()
        )
    }

    /// The underlying calendar date.
    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Debug for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExpiryDate({})", self.0)
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_roundtrip() {
        let date = ExpiryDate::from_ymd(2026, 6, 30).unwrap();
        assert_eq!(date.yymmdd(), "260630");
        assert_eq!(ExpiryDate::parse_yymmdd("260630").unwrap(), date);
    }

    #[test]
    fn rejects_day_zero() {
        assert!(ExpiryDate::parse_yymmdd("260600").is_err());
    }

    #[test]
    fn rejects_month_thirteen() {
        assert!(ExpiryDate::parse_yymmdd("261301").is_err());
    }

    #[test]
    fn rejects_impossible_february() {
        assert!(ExpiryDate::parse_yymmdd("250230").is_err());
    }

    #[test]
    fn accepts_leap_day() {
        assert!(ExpiryDate::parse_yymmdd("280229").is_ok());
    }

    #[test]
    fn rejects_short_segment() {
        assert!(ExpiryDate::parse_yymmdd("2606").is_err());
    }

    #[test]
    fn rejects_pre_window_year() {
        assert!(ExpiryDate::from_ymd(1999, 12, 31).is_err());
    }

    #[test]
    fn display_is_iso() {
        let date = ExpiryDate::from_ymd(2030, 1, 2).unwrap();
        assert_eq!(date.to_string(), "2030-01-02");
    }
}
