use std::fmt;

use serde::{Deserialize, Serialize};

use packtrace_codec::CodecError;
use packtrace_timeline::IntegrityFinding;
use packtrace_types::{ChannelId, CustodyEvent, PackCode};

use crate::actor::role_for;

const MASKED_SERIAL_WIDTH: usize = 8;
const SERIAL_VISIBLE_SUFFIX: usize = 4;

/// Terminal verification status for one scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStatus {
    /// No code submitted yet; mirrors the front-end resting state and is
    /// never produced by `verify`.
    Idle,
    Genuine,
    Unknown,
    Mismatch,
    Recalled,
    Error,
}

impl fmt::Display for VerifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Genuine => "genuine",
            Self::Unknown => "unknown",
            Self::Mismatch => "mismatch",
            Self::Recalled => "recalled",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// User-safe projection of the decoded code. The serial is already masked;
/// internal comparisons never use this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackCodeView {
    pub gtin: String,
    pub lot: String,
    pub expiry: String,
    pub serial: Option<String>,
}

impl PackCodeView {
    pub fn from_code(code: &PackCode) -> Self {
        Self {
            gtin: code.gtin.as_str().to_string(),
            lot: code.lot.as_str().to_string(),
            expiry: code.expiry.to_string(),
            serial: code.serial.as_ref().map(|s| mask_serial(s.as_str())),
        }
    }
}

/// User-safe projection of one custody event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEventView {
    pub seq: u64,
    pub kind: String,
    pub actor: String,
    pub consensus_timestamp: i64,
    pub from_facility: Option<String>,
    pub to_facility: Option<String>,
}

impl CustodyEventView {
    pub fn from_event(event: &CustodyEvent) -> Self {
        Self {
            seq: event.seq,
            kind: event.kind.to_string(),
            actor: role_for(&event.kind).label().to_string(),
            consensus_timestamp: event.consensus_timestamp,
            from_facility: event.from_facility.clone(),
            to_facility: event.to_facility.clone(),
        }
    }
}

/// Outcome of one verification request.
///
/// Constructed once per call and never mutated afterwards. Everything on
/// it is safe to show an end user: serials are masked, diagnostics are
/// reduced to reason codes and generic messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: VerifyStatus,
    pub message: String,
    /// Stable reason code for `error` outcomes.
    pub reason_code: Option<String>,
    pub code: Option<PackCodeView>,
    pub channel: Option<ChannelId>,
    pub timeline: Vec<CustodyEventView>,
    /// Opaque token resuming the timeline after this page.
    pub next_cursor: Option<String>,
    /// Non-error note attached in expected conditions (unlinked batch).
    pub advisory: Option<String>,
    /// Set when the custody log could not be read and the verdict was
    /// derived from local data only.
    pub timeline_error: Option<String>,
    /// Set when chain validation found a break or an unfilled gap.
    pub integrity_error: Option<IntegrityFinding>,
}

impl VerificationResult {
    /// The resting state before any code has been submitted.
    pub fn idle() -> Self {
        Self {
            status: VerifyStatus::Idle,
            message: String::new(),
            reason_code: None,
            code: None,
            channel: None,
            timeline: Vec::new(),
            next_cursor: None,
            advisory: None,
            timeline_error: None,
            integrity_error: None,
        }
    }

    /// A scan rejected by the codec. Only the reason code crosses the
    /// boundary; raw diagnostics stay internal.
    pub fn validation_error(error: &CodecError) -> Self {
        Self {
            status: VerifyStatus::Error,
            message: "The scanned code could not be read.".into(),
            reason_code: Some(error.reason_code().to_string()),
            ..Self::idle()
        }
    }

    /// An unexpected internal fault. The category is all the caller sees.
    pub fn internal_error(reason_code: &str) -> Self {
        Self {
            status: VerifyStatus::Error,
            message: "Verification is temporarily unavailable.".into(),
            reason_code: Some(reason_code.to_string()),
            ..Self::idle()
        }
    }

    /// Decoded cleanly but no matching batch exists locally. A first-class
    /// outcome, not an error.
    pub fn unknown(code: &PackCode) -> Self {
        Self {
            status: VerifyStatus::Unknown,
            message: "This pack is not in the local records. It may be genuine but unregistered."
                .into(),
            code: Some(PackCodeView::from_code(code)),
            ..Self::idle()
        }
    }
}

/// Mask a serial to a fixed-width form keeping at most the last four
/// characters visible. Applied only at the projection boundary.
pub fn mask_serial(serial: &str) -> String {
    let chars: Vec<char> = serial.chars().collect();
    let visible = chars.len().min(SERIAL_VISIBLE_SUFFIX);
    let suffix: String = chars[chars.len() - visible..].iter().collect();
    let masked = MASKED_SERIAL_WIDTH.saturating_sub(visible);
    format!("{}{}", "*".repeat(masked), suffix)
}

#[cfg(test)]
mod tests {
    use packtrace_types::{EventKind, ExpiryDate, Gtin, LogHash, LotCode, SerialNumber};

    use super::*;

    fn code(serial: Option<&str>) -> PackCode {
        PackCode {
            gtin: Gtin::parse("09506000134352").unwrap(),
            expiry: ExpiryDate::from_ymd(2026, 6, 30).unwrap(),
            lot: LotCode::parse("LOT42").unwrap(),
            serial: serial.map(|s| SerialNumber::parse(s).unwrap()),
        }
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_serial("SN123456789"), "****6789");
    }

    #[test]
    fn mask_is_fixed_width() {
        assert_eq!(mask_serial("AB").len(), MASKED_SERIAL_WIDTH);
        assert_eq!(mask_serial("ABCDEFGHIJKLMNOP").len(), MASKED_SERIAL_WIDTH);
    }

    #[test]
    fn mask_short_serial_shows_at_most_its_chars() {
        assert_eq!(mask_serial("AB"), "******AB");
    }

    #[test]
    fn view_masks_serial() {
        let view = PackCodeView::from_code(&code(Some("SER123456")));
        assert_eq!(view.serial.as_deref(), Some("****3456"));
    }

    #[test]
    fn view_keeps_identifying_fields_raw() {
        let view = PackCodeView::from_code(&code(None));
        assert_eq!(view.gtin, "09506000134352");
        assert_eq!(view.lot, "LOT42");
        assert_eq!(view.expiry, "2026-06-30");
        assert!(view.serial.is_none());
    }

    #[test]
    fn event_view_carries_actor_label() {
        let event = CustodyEvent {
            seq: 9,
            kind: EventKind::Dispensed,
            consensus_timestamp: 1_700_000_000_000,
            payload_hash: LogHash::from_raw([1; 32]),
            running_hash: LogHash::from_raw([2; 32]),
            from_facility: None,
            to_facility: Some("Main St Pharmacy".into()),
        };
        let view = CustodyEventView::from_event(&event);
        assert_eq!(view.kind, "DISPENSED");
        assert_eq!(view.actor, "Pharmacy");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&VerifyStatus::Genuine).unwrap(),
            "\"genuine\""
        );
        assert_eq!(VerifyStatus::Mismatch.to_string(), "mismatch");
    }

    #[test]
    fn validation_error_exposes_reason_code_only() {
        let result =
            VerificationResult::validation_error(&CodecError::MalformedCode("17 bytes".into()));
        assert_eq!(result.status, VerifyStatus::Error);
        assert_eq!(result.reason_code.as_deref(), Some("MalformedCode"));
        assert!(!result.message.contains("17 bytes"));
    }
}
