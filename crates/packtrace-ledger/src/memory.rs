use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use packtrace_chain::running_hash;
use packtrace_types::{ChannelId, CustodyEvent, EventKind, LogHash};

use crate::cursor::{Cursor, ScanOrder};
use crate::error::LedgerError;
use crate::page::LogPage;
use crate::traits::LogReader;
use crate::MAX_PAGE_LIMIT;

// Deterministic consensus clock for the in-memory log: a fixed base plus
// one second per entry. Tests can assert on timestamps without wall-clock
// coupling; the real log assigns its own.
const CONSENSUS_BASE_MS: i64 = 1_700_000_000_000;

/// What an external actor submits to the log for one custody event.
///
/// The log assigns everything else: sequence number, consensus timestamp,
/// payload hash, and running hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSubmission {
    pub kind: EventKind,
    /// Application payload; hashed canonically, never interpreted here.
    pub body: serde_json::Value,
    pub from_facility: Option<String>,
    pub to_facility: Option<String>,
}

/// In-memory custody log for tests, local demos, and embedding.
///
/// Mirrors the external consensus log's contract on both sides: `submit`
/// returns the assigned `(sequence number, running hash)` the way the
/// write-only network API does, and [`LogReader`] serves ordered pages.
pub struct InMemoryEventLog {
    inner: RwLock<HashMap<ChannelId, Vec<CustodyEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Append a submission to a channel, returning the assigned sequence
    /// number and running hash.
    pub fn submit(
        &self,
        channel: &ChannelId,
        submission: &EventSubmission,
    ) -> Result<(u64, LogHash), LedgerError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| LedgerError::Unreachable("log write lock poisoned".into()))?;

        let stream = state.entry(channel.clone()).or_default();
        let seq = (stream.len() + 1) as u64;
        let prior = stream.last().map(|e| e.running_hash);
        let payload_hash = hash_submission(submission)?;
        let running = running_hash(prior.as_ref(), &payload_hash);

        stream.push(CustodyEvent {
            seq,
            kind: submission.kind.clone(),
            consensus_timestamp: CONSENSUS_BASE_MS + (seq as i64 - 1) * 1000,
            payload_hash,
            running_hash: running,
            from_facility: submission.from_facility.clone(),
            to_facility: submission.to_facility.clone(),
        });

        Ok((seq, running))
    }

    /// Overwrite a stored entry (test hook for simulating tampering).
    #[doc(hidden)]
    pub fn corrupt_entry(
        &self,
        channel: &ChannelId,
        seq: u64,
        payload_hash: LogHash,
    ) -> Result<(), LedgerError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| LedgerError::Unreachable("log write lock poisoned".into()))?;
        let stream = state
            .get_mut(channel)
            .ok_or_else(|| LedgerError::MalformedPage("unknown channel".into()))?;
        let entry = stream
            .iter_mut()
            .find(|e| e.seq == seq)
            .ok_or_else(|| LedgerError::MalformedPage(format!("no entry at seq {seq}")))?;
        entry.payload_hash = payload_hash;
        Ok(())
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogReader for InMemoryEventLog {
    async fn fetch_page(
        &self,
        channel: &ChannelId,
        cursor: Option<&Cursor>,
        limit: u32,
        order: ScanOrder,
    ) -> Result<LogPage, LedgerError> {
        if limit == 0 {
            return Err(LedgerError::InvalidLimit);
        }
        let limit = limit.min(MAX_PAGE_LIMIT) as usize;

        if let Some(cursor) = cursor {
            if cursor.order != order {
                return Err(LedgerError::InvalidCursor(format!(
                    "cursor direction {} does not match requested {}",
                    cursor.order, order
                )));
            }
        }

        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::Unreachable("log read lock poisoned".into()))?;

        // Unknown channel reads as empty: a freshly linked batch has no
        // entries yet and that is not an error.
        let Some(stream) = state.get(channel) else {
            return Ok(LogPage::empty());
        };

        let entries: Vec<CustodyEvent> = match order {
            ScanOrder::Ascending => {
                let after = cursor.map_or(0, |c| c.last_seq);
                stream
                    .iter()
                    .filter(|e| e.seq > after)
                    .take(limit)
                    .cloned()
                    .collect()
            }
            ScanOrder::Descending => {
                let before = cursor.map_or(u64::MAX, |c| c.last_seq);
                stream
                    .iter()
                    .rev()
                    .filter(|e| e.seq < before)
                    .take(limit)
                    .cloned()
                    .collect()
            }
        };

        let next_cursor = if entries.len() == limit {
            entries.last().map(|e| Cursor::new(e.seq, order))
        } else {
            None
        };

        let prior_running_hash = entries
            .iter()
            .map(|e| e.seq)
            .min()
            .filter(|&first| first > 1)
            .and_then(|first| stream.iter().find(|e| e.seq == first - 1))
            .map(|e| e.running_hash);

        Ok(LogPage {
            entries,
            next_cursor,
            prior_running_hash,
        })
    }
}

fn hash_submission(submission: &EventSubmission) -> Result<LogHash, LedgerError> {
    let encoded = serde_json::to_vec(&(&submission.kind, &submission.body))
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"packtrace-event-v1:");
    hasher.update(&encoded);
    Ok(LogHash::from_raw(*hasher.finalize().as_bytes()))
}
