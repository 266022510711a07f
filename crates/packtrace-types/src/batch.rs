use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::expiry::ExpiryDate;
use crate::fields::{LotCode, SerialNumber};
use crate::gtin::Gtin;

/// Unique identifier for a locally registered batch (UUID v7 for
/// time-ordering).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(uuid::Uuid);

impl BatchId {
    /// Generate a new time-ordered batch ID (UUID v7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchId({})", self.short_id())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identifying fields a structured code carries.
///
/// This is what a scan yields after decoding. The pack quantity is carried
/// out-of-band and is therefore absent here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackCode {
    pub gtin: Gtin,
    pub expiry: ExpiryDate,
    pub lot: LotCode,
    pub serial: Option<SerialNumber>,
}

impl PackCode {
    /// Whether the identifying fields (gtin, lot, expiry) match another
    /// code exactly. Serial is intentionally excluded: a batch covers many
    /// serials.
    pub fn identifies_same_batch(&self, other: &PackCode) -> bool {
        self.gtin == other.gtin && self.lot == other.lot && self.expiry == other.expiry
    }
}

/// Full description of a batch as registered locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDescriptor {
    pub gtin: Gtin,
    pub lot: LotCode,
    pub expiry: ExpiryDate,
    pub serial: Option<SerialNumber>,
    quantity: u32,
}

impl BatchDescriptor {
    /// Build a descriptor; quantity must be positive.
    pub fn new(
        gtin: Gtin,
        lot: LotCode,
        expiry: ExpiryDate,
        serial: Option<SerialNumber>,
        quantity: u32,
    ) -> Result<Self, TypeError> {
        if quantity == 0 {
            return Err(TypeError::InvalidQuantity);
        }
        Ok(Self {
            gtin,
            lot,
            expiry,
            serial,
            quantity,
        })
    }

    /// Number of packs in the batch.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Project the subset of fields the structured code carries.
    pub fn pack_code(&self) -> PackCode {
        PackCode {
            gtin: self.gtin.clone(),
            expiry: self.expiry,
            lot: self.lot.clone(),
            serial: self.serial.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(lot: &str, serial: Option<&str>) -> BatchDescriptor {
        BatchDescriptor::new(
            Gtin::parse("09506000134352").unwrap(),
            LotCode::parse(lot).unwrap(),
            ExpiryDate::from_ymd(2026, 6, 30).unwrap(),
            serial.map(|s| SerialNumber::parse(s).unwrap()),
            100,
        )
        .unwrap()
    }

    #[test]
    fn batch_ids_are_unique() {
        assert_ne!(BatchId::new(), BatchId::new());
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = BatchDescriptor::new(
            Gtin::parse("09506000134352").unwrap(),
            LotCode::parse("L1").unwrap(),
            ExpiryDate::from_ymd(2026, 6, 30).unwrap(),
            None,
            0,
        )
        .unwrap_err();
        assert_eq!(err, TypeError::InvalidQuantity);
    }

    #[test]
    fn pack_code_drops_quantity_only() {
        let d = descriptor("LOT42", Some("SER1"));
        let code = d.pack_code();
        assert_eq!(code.gtin, d.gtin);
        assert_eq!(code.lot, d.lot);
        assert_eq!(code.expiry, d.expiry);
        assert_eq!(code.serial, d.serial);
    }

    #[test]
    fn same_batch_ignores_serial() {
        let a = descriptor("LOT42", Some("SER1")).pack_code();
        let b = descriptor("LOT42", Some("SER2")).pack_code();
        assert!(a.identifies_same_batch(&b));
    }

    #[test]
    fn different_lot_is_different_batch() {
        let a = descriptor("LOT42", None).pack_code();
        let b = descriptor("LOT43", None).pack_code();
        assert!(!a.identifies_same_batch(&b));
    }
}
