use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use packtrace_types::{BatchDescriptor, BatchId, ChannelId, CustodyEvent, PackCode};

use crate::error::StoreError;
use crate::record::BatchRecord;
use crate::traits::BatchStore;

/// In-memory batch store for tests, local demos, and embedding.
pub struct InMemoryBatchStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    batches: HashMap<BatchId, BatchRecord>,
    events: HashMap<BatchId, Vec<CustodyEvent>>,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreState::default()),
        }
    }

    /// Register a batch, returning its new id.
    pub fn register_batch(
        &self,
        descriptor: BatchDescriptor,
        channel: Option<ChannelId>,
        registered_at: i64,
    ) -> Result<BatchId, StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("store write lock poisoned".into()))?;

        let id = BatchId::new();
        state.batches.insert(
            id.clone(),
            BatchRecord {
                id: id.clone(),
                descriptor,
                channel,
                registered_at,
            },
        );
        Ok(id)
    }

    /// Link a provisional batch to its consensus log channel.
    pub fn link_channel(&self, batch: &BatchId, channel: ChannelId) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("store write lock poisoned".into()))?;

        let record = state
            .batches
            .get_mut(batch)
            .ok_or_else(|| StoreError::Backend(format!("unknown batch {batch}")))?;
        record.channel = Some(channel);
        Ok(())
    }

    /// Record a local custody row for a batch. Rows are kept ascending by
    /// sequence number regardless of insert order.
    pub fn record_event(&self, batch: &BatchId, event: CustodyEvent) -> Result<(), StoreError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("store write lock poisoned".into()))?;

        if !state.batches.contains_key(batch) {
            return Err(StoreError::Backend(format!("unknown batch {batch}")));
        }
        let rows = state.events.entry(batch.clone()).or_default();
        rows.push(event);
        rows.sort_by_key(|e| e.seq);
        Ok(())
    }
}

impl Default for InMemoryBatchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchStore for InMemoryBatchStore {
    async fn find_batch(&self, code: &PackCode) -> Result<Option<BatchRecord>, StoreError> {
        let state = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("store read lock poisoned".into()))?;

        let mut candidates: Vec<&BatchRecord> = state
            .batches
            .values()
            .filter(|r| r.descriptor.gtin == code.gtin)
            .collect();
        candidates.sort_by_key(|r| r.registered_at);

        // Serialized batches resolve on the scanned serial; otherwise the
        // exact batch match wins over the first same-product candidate.
        let resolved = candidates
            .iter()
            .find(|r| code.serial.is_some() && r.descriptor.serial == code.serial)
            .or_else(|| {
                candidates
                    .iter()
                    .find(|r| r.descriptor.pack_code().identifies_same_batch(code))
            })
            .or_else(|| candidates.first());

        Ok(resolved.map(|r| (*r).clone()))
    }

    async fn list_local_events(&self, batch: &BatchId) -> Result<Vec<CustodyEvent>, StoreError> {
        let state = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("store read lock poisoned".into()))?;

        Ok(state.events.get(batch).cloned().unwrap_or_default())
    }
}
