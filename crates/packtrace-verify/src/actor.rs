use serde::{Deserialize, Serialize};

use packtrace_types::EventKind;

/// Display role shown next to a custody event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRole {
    Manufacturer,
    Distributor,
    Pharmacy,
    Auditor,
    /// Fallback for event kinds this build does not recognize.
    Operator,
}

impl ActorRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Manufacturer => "Manufacturer",
            Self::Distributor => "Distributor",
            Self::Pharmacy => "Pharmacy",
            Self::Auditor => "Auditor",
            Self::Operator => "Operator",
        }
    }
}

/// Map an event kind to its display role.
///
/// The match is exhaustive over the closed variants so adding an event
/// kind is a compile-time obligation; entries submitted by newer producers
/// arrive as `Other` and fail closed to the generic operator label.
pub fn role_for(kind: &EventKind) -> ActorRole {
    match kind {
        EventKind::Manufactured => ActorRole::Manufacturer,
        EventKind::Handover | EventKind::Received => ActorRole::Distributor,
        EventKind::Dispensed => ActorRole::Pharmacy,
        EventKind::Recalled => ActorRole::Auditor,
        EventKind::Other(_) => ActorRole::Operator,
    }
}
