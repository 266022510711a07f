use serde::{Deserialize, Serialize};

use packtrace_ledger::Cursor;
use packtrace_types::{ChannelState, CustodyEvent};

/// Advisory attached to a merged timeline for expected, non-error
/// conditions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineNote {
    /// The batch has no consensus channel yet (provisional registration).
    Unlinked,
    /// The remote log could not be read; the timeline shows local records
    /// only. The reason is internal diagnostic detail, not caller-facing.
    RemoteDegraded { reason: String },
}

/// Integrity finding from chain validation over the merged run.
///
/// A gap survives here only after the automatic re-fetch of the missing
/// range failed to fill it; a break means a running hash did not match and
/// nothing at or past that sequence is trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityFinding {
    Broken { seq: u64 },
    Gap { missing_seq: u64 },
}

impl IntegrityFinding {
    /// Whether this finding invalidates trust (as opposed to signalling
    /// incomplete data).
    pub fn is_tampering(&self) -> bool {
        matches!(self, Self::Broken { .. })
    }
}

/// One reconciled, deduplicated page of a batch's custody timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedTimeline {
    /// Events in the requested order, deduplicated by sequence number.
    pub events: Vec<CustodyEvent>,
    /// Resume position in the requested order; `None` when exhausted.
    pub next_cursor: Option<Cursor>,
    pub note: Option<TimelineNote>,
    pub integrity: Option<IntegrityFinding>,
    /// Chain resume point after the validated run, when validation ran and
    /// succeeded.
    pub state: Option<ChannelState>,
}

impl MergedTimeline {
    /// An empty timeline with an advisory note.
    pub fn empty_with_note(note: TimelineNote) -> Self {
        Self {
            events: Vec::new(),
            next_cursor: None,
            note: Some(note),
            integrity: None,
            state: None,
        }
    }

    /// The most recent event by sequence number, regardless of requested
    /// output order.
    pub fn latest_event(&self) -> Option<&CustodyEvent> {
        self.events.iter().max_by_key(|e| e.seq)
    }
}
