use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::LogHash;

/// Classification of custody events.
///
/// The closed variants cover every event the system itself submits.
/// `Other` absorbs entries written to the channel by newer producers so an
/// unknown kind degrades a label, never a verification.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Batch produced and registered by the manufacturer.
    Manufactured,
    /// Custody handed to the next party in the chain.
    Handover,
    /// Custody receipt confirmed by the receiving party.
    Received,
    /// Pack dispensed to a patient.
    Dispensed,
    /// Batch recalled by an auditor or authority.
    Recalled,
    /// Unrecognized kind submitted by a newer producer.
    Other(String),
}

impl EventKind {
    /// Whether this event revokes trust in the batch.
    pub fn is_recall(&self) -> bool {
        matches!(self, Self::Recalled)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manufactured => write!(f, "MANUFACTURED"),
            Self::Handover => write!(f, "HANDOVER"),
            Self::Received => write!(f, "RECEIVED"),
            Self::Dispensed => write!(f, "DISPENSED"),
            Self::Recalled => write!(f, "RECALLED"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// One immutable entry in a channel's custody log.
///
/// Created once at submission time by an external actor; never updated or
/// deleted. `consensus_timestamp` is assigned by the log, not the
/// submitter. Ordering is solely by `seq` — never by arrival time.
/// The facility fields are resolved display names enriched from local
/// records; the log itself does not carry them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEvent {
    /// Channel-assigned, strictly increasing position in the log.
    pub seq: u64,
    pub kind: EventKind,
    /// Milliseconds since the epoch, assigned at consensus.
    pub consensus_timestamp: i64,
    /// Hash of the submitted payload.
    pub payload_hash: LogHash,
    /// Running hash declared by the log for this entry.
    pub running_hash: LogHash,
    pub from_facility: Option<String>,
    pub to_facility: Option<String>,
}

impl CustodyEvent {
    /// Merge the authoritative remote copy of an entry with a local copy.
    ///
    /// The remote log wins for everything it assigns (kind, timestamp,
    /// hashes, seq); the local row wins only for facility-name enrichment
    /// the log does not carry.
    pub fn merged_with_local(remote: &CustodyEvent, local: &CustodyEvent) -> CustodyEvent {
        CustodyEvent {
            from_facility: local
                .from_facility
                .clone()
                .or_else(|| remote.from_facility.clone()),
            to_facility: local
                .to_facility
                .clone()
                .or_else(|| remote.to_facility.clone()),
            ..remote.clone()
        }
    }
}
