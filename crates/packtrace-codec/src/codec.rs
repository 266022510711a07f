use serde::{Deserialize, Serialize};

use packtrace_types::{
    BatchDescriptor, ExpiryDate, Gtin, LotCode, PackCode, SerialNumber, TypeError,
    GROUP_SEPARATOR,
};

use crate::error::CodecError;

const AI_GTIN: &str = "01";
const AI_EXPIRY: &str = "17";
const AI_LOT: &str = "10";
const AI_SERIAL: &str = "21";

// 01 + 14 digits + 17 + 6 digits + 10
const FIXED_PREFIX_LEN: usize = 2 + 14 + 2 + 6 + 2;

/// The encoded wire form of a pack code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredCode {
    /// The scannable element string, group-separator delimited.
    pub element_string: String,
    /// Human-readable interpretation line rendered under the symbol.
    pub human_readable: String,
}

/// Codec for encoding/decoding pack structured codes.
pub struct PackCodec;

impl PackCodec {
    /// Encode a batch descriptor into its structured code.
    ///
    /// Quantity is carried out-of-band and is not part of the payload.
    pub fn encode(descriptor: &BatchDescriptor) -> Result<StructuredCode, CodecError> {
        Self::encode_code(&descriptor.pack_code())
    }

    /// Encode the identifying fields into the element string and the
    /// human-readable line.
    pub fn encode_code(code: &PackCode) -> Result<StructuredCode, CodecError> {
        // The typed fields uphold these invariants already; the codec
        // re-checks them so the operation's contract does not depend on
        // how the caller obtained the value.
        Gtin::parse(code.gtin.as_str())
            .map_err(|e| CodecError::InvalidIdentifier(e.to_string()))?;
        check_field("lot", code.lot.as_str())?;
        if let Some(serial) = &code.serial {
            check_field("serial", serial.as_str())?;
        }
        ExpiryDate::parse_yymmdd(&code.expiry.yymmdd())
            .map_err(|e| CodecError::InvalidDate(e.to_string()))?;

        let mut element = format!(
            "{AI_GTIN}{}{AI_EXPIRY}{}{AI_LOT}{}",
            code.gtin.as_str(),
            code.expiry.yymmdd(),
            code.lot.as_str()
        );
        let mut human = format!(
            "({AI_GTIN}){}({AI_EXPIRY}){}({AI_LOT}){}",
            code.gtin.as_str(),
            code.expiry.yymmdd(),
            code.lot.as_str()
        );

        if let Some(serial) = &code.serial {
            // The lot is variable-length, so a separator must terminate it
            // before another field can follow.
            element.push(GROUP_SEPARATOR);
            element.push_str(AI_SERIAL);
            element.push_str(serial.as_str());
            human.push_str(&format!("({AI_SERIAL}){}", serial.as_str()));
        }

        Ok(StructuredCode {
            element_string: element,
            human_readable: human,
        })
    }

    /// Decode a scanned element string back into the pack code it carries.
    ///
    /// Tolerates an absent serial and a trailing group separator left by a
    /// longer carrier payload.
    pub fn decode(raw: &str) -> Result<PackCode, CodecError> {
        let raw = raw.strip_suffix(GROUP_SEPARATOR).unwrap_or(raw);

        if raw.len() < FIXED_PREFIX_LEN + 1 {
            return Err(CodecError::MalformedCode(format!(
                "expected at least {} characters, got {}",
                FIXED_PREFIX_LEN + 1,
                raw.len()
            )));
        }

        let tag = slice(raw, 0, 2)?;
        if tag != AI_GTIN {
            return Err(CodecError::MalformedCode(format!(
                "expected identifier tag {AI_GTIN}, found {tag:?}"
            )));
        }
        let gtin_seg = slice(raw, 2, 16)?;
        let gtin = Gtin::parse(gtin_seg).map_err(|e| match e {
            TypeError::CheckDigit { expected, actual } => {
                CodecError::ChecksumFailed { expected, actual }
            }
            other => CodecError::MalformedCode(other.to_string()),
        })?;

        let tag = slice(raw, 16, 18)?;
        if tag != AI_EXPIRY {
            return Err(CodecError::MalformedCode(format!(
                "expected expiry tag {AI_EXPIRY}, found {tag:?}"
            )));
        }
        let expiry = ExpiryDate::parse_yymmdd(slice(raw, 18, 24)?)
            .map_err(|e| CodecError::InvalidDate(e.to_string()))?;

        let tag = slice(raw, 24, 26)?;
        if tag != AI_LOT {
            return Err(CodecError::MalformedCode(format!(
                "expected lot tag {AI_LOT}, found {tag:?}"
            )));
        }

        let rest = slice(raw, 26, raw.len())?;
        let (lot_seg, serial_seg) = match rest.split_once(GROUP_SEPARATOR) {
            None => (rest, None),
            Some((lot, "")) => (lot, None),
            Some((lot, tail)) => {
                let serial = tail.strip_prefix(AI_SERIAL).ok_or_else(|| {
                    CodecError::MalformedCode(format!(
                        "expected serial tag {AI_SERIAL} after separator"
                    ))
                })?;
                if serial.contains(GROUP_SEPARATOR) {
                    return Err(CodecError::MalformedCode(
                        "trailing data after serial".into(),
                    ));
                }
                (lot, Some(serial))
            }
        };

        let lot =
            LotCode::parse(lot_seg).map_err(|e| CodecError::MalformedCode(e.to_string()))?;
        let serial = serial_seg
            .map(SerialNumber::parse)
            .transpose()
            .map_err(|e| CodecError::MalformedCode(e.to_string()))?;

        Ok(PackCode {
            gtin,
            expiry,
            lot,
            serial,
        })
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), CodecError> {
    if value.contains(GROUP_SEPARATOR) {
        return Err(CodecError::InvalidField {
            field,
            reason: "contains the group separator".into(),
        });
    }
    Ok(())
}

fn slice(raw: &str, from: usize, to: usize) -> Result<&str, CodecError> {
    raw.get(from..to)
        .ok_or_else(|| CodecError::MalformedCode("prefix cannot be sliced".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(serial: Option<&str>) -> BatchDescriptor {
        BatchDescriptor::new(
            Gtin::parse("09506000134352").unwrap(),
            LotCode::parse("LOT42A").unwrap(),
            ExpiryDate::from_ymd(2026, 6, 30).unwrap(),
            serial.map(|s| SerialNumber::parse(s).unwrap()),
            10,
        )
        .unwrap()
    }

    #[test]
    fn encode_without_serial() {
        let code = PackCodec::encode(&descriptor(None)).unwrap();
        assert_eq!(code.element_string, "01095060001343521726063010LOT42A");
        assert_eq!(code.human_readable, "(01)09506000134352(17)260630(10)LOT42A");
    }

    #[test]
    fn encode_with_serial_inserts_separator() {
        let code = PackCodec::encode(&descriptor(Some("SER0001"))).unwrap();
        let expected = format!("01095060001343521726063010LOT42A{GROUP_SEPARATOR}21SER0001");
        assert_eq!(code.element_string, expected);
        assert_eq!(
            code.human_readable,
            "(01)09506000134352(17)260630(10)LOT42A(21)SER0001"
        );
    }

    #[test]
    fn roundtrip_without_serial() {
        let d = descriptor(None);
        let encoded = PackCodec::encode(&d).unwrap();
        let decoded = PackCodec::decode(&encoded.element_string).unwrap();
        assert_eq!(decoded, d.pack_code());
    }

    #[test]
    fn roundtrip_with_serial() {
        let d = descriptor(Some("SER0001"));
        let encoded = PackCodec::encode(&d).unwrap();
        let decoded = PackCodec::decode(&encoded.element_string).unwrap();
        assert_eq!(decoded, d.pack_code());
    }

    #[test]
    fn decode_tolerates_trailing_separator() {
        let d = descriptor(Some("SER0001"));
        let mut raw = PackCodec::encode(&d).unwrap().element_string;
        raw.push(GROUP_SEPARATOR);
        assert_eq!(PackCodec::decode(&raw).unwrap(), d.pack_code());
    }

    #[test]
    fn decode_tolerates_separator_after_lot_only() {
        let raw = format!("01095060001343521726063010LOT42A{GROUP_SEPARATOR}");
        let decoded = PackCodec::decode(&raw).unwrap();
        assert_eq!(decoded.lot.as_str(), "LOT42A");
        assert!(decoded.serial.is_none());
    }

    #[test]
    fn decode_rejects_truncated_prefix() {
        let err = PackCodec::decode("0109506").unwrap_err();
        assert!(matches!(err, CodecError::MalformedCode(_)));
    }

    #[test]
    fn decode_rejects_wrong_leading_tag() {
        let err = PackCodec::decode("99095060001343521726063010LOT1").unwrap_err();
        assert!(matches!(err, CodecError::MalformedCode(_)));
    }

    #[test]
    fn decode_rejects_bad_check_digit() {
        let err = PackCodec::decode("01095060001343531726063010LOT1").unwrap_err();
        assert_eq!(
            err,
            CodecError::ChecksumFailed {
                expected: '2',
                actual: '3'
            }
        );
    }

    #[test]
    fn decode_rejects_impossible_date() {
        let err = PackCodec::decode("01095060001343521726323010LOT1").unwrap_err();
        assert!(matches!(err, CodecError::InvalidDate(_)));
    }

    #[test]
    fn decode_rejects_empty_lot() {
        // An empty lot is only expressible with a separator right after
        // the lot tag.
        let raw = format!("01095060001343521726063010{GROUP_SEPARATOR}21SER1");
        assert!(matches!(
            PackCodec::decode(&raw),
            Err(CodecError::MalformedCode(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_serial_tag() {
        let raw = format!("01095060001343521726063010LOT1{GROUP_SEPARATOR}SER1");
        assert!(matches!(
            PackCodec::decode(&raw),
            Err(CodecError::MalformedCode(_))
        ));
    }

    #[test]
    fn decode_rejects_data_after_serial() {
        let raw = format!(
            "01095060001343521726063010LOT1{GROUP_SEPARATOR}21SER1{GROUP_SEPARATOR}10X"
        );
        assert!(matches!(
            PackCodec::decode(&raw),
            Err(CodecError::MalformedCode(_))
        ));
    }

    #[test]
    fn decode_rejects_multibyte_garbage() {
        assert!(matches!(
            PackCodec::decode("01ø95060001343521726063010LOT1"),
            Err(_)
        ));
    }

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(
            CodecError::MalformedCode("x".into()).reason_code(),
            "MalformedCode"
        );
        assert_eq!(
            CodecError::ChecksumFailed {
                expected: '0',
                actual: '1'
            }
            .reason_code(),
            "ChecksumFailed"
        );
    }
}
