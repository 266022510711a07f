use async_trait::async_trait;

use packtrace_types::{BatchId, CustodyEvent, PackCode};

use crate::error::StoreError;
use crate::record::BatchRecord;

/// Read boundary over the local batch store.
///
/// The verification core is strictly read-only with respect to persisted
/// state; no write operations exist on this contract.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Resolve a candidate batch from the identifying fields of a scanned
    /// code.
    ///
    /// Resolution is by trade item number first, narrowed by serial when
    /// the store holds serialized batches. Field equality is re-checked by
    /// the caller, so a candidate matched on GTIN with a differing lot is
    /// a valid return value (it becomes a `mismatch`, not an `unknown`).
    async fn find_batch(&self, code: &PackCode) -> Result<Option<BatchRecord>, StoreError>;

    /// Local custody rows recorded for a batch, ascending by sequence
    /// number. Unknown batches yield an empty list.
    async fn list_local_events(&self, batch: &BatchId) -> Result<Vec<CustodyEvent>, StoreError>;
}
