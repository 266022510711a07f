use serde::{Deserialize, Serialize};

use packtrace_types::{CustodyEvent, LogHash};

use crate::cursor::Cursor;

/// One page of ordered custody log entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPage {
    /// Entries in the requested direction; never out of sequence order.
    pub entries: Vec<CustodyEvent>,
    /// Resume position after this page, `None` when the log is exhausted
    /// as of this read.
    pub next_cursor: Option<Cursor>,
    /// Running hash of the entry immediately preceding this page in
    /// ascending order; `None` when the page starts at genesis (or is
    /// empty).
    pub prior_running_hash: Option<LogHash>,
}

impl LogPage {
    /// An empty page with nothing to resume.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            next_cursor: None,
            prior_running_hash: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
