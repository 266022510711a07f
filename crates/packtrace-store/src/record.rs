use serde::{Deserialize, Serialize};

use packtrace_types::{BatchDescriptor, BatchId, ChannelId};

/// A locally registered batch.
///
/// `channel` is `None` for provisional batches that have not yet been
/// linked to a consensus log stream; verification of such a batch yields an
/// empty timeline with an advisory note, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: BatchId,
    pub descriptor: BatchDescriptor,
    pub channel: Option<ChannelId>,
    /// Milliseconds since the epoch at registration time.
    pub registered_at: i64,
}

impl BatchRecord {
    /// Whether this batch has been linked to a consensus log stream.
    pub fn is_linked(&self) -> bool {
        self.channel.is_some()
    }
}
