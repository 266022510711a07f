use async_trait::async_trait;

use packtrace_types::ChannelId;

use crate::cursor::{Cursor, ScanOrder};
use crate::error::LedgerError;
use crate::page::LogPage;

/// Read boundary over the append-only consensus log.
///
/// Implementations must never return entries out of sequence order for the
/// requested direction, and must treat an unknown channel as empty rather
/// than erroring — a channel with no entries yet is a normal state for a
/// freshly linked batch.
#[async_trait]
pub trait LogReader: Send + Sync {
    /// Fetch one page of entries for a channel.
    ///
    /// `limit` is clamped to the hard cap by implementations; a zero limit
    /// is an error. A cursor whose direction disagrees with `order` is
    /// rejected as invalid.
    async fn fetch_page(
        &self,
        channel: &ChannelId,
        cursor: Option<&Cursor>,
        limit: u32,
        order: ScanOrder,
    ) -> Result<LogPage, LedgerError>;
}
