use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use packtrace_chain::{ChainOutcome, ChainValidator};
use packtrace_ledger::{Cursor, LogPage, LogReader, ScanOrder, MAX_PAGE_LIMIT};
use packtrace_types::{ChannelId, ChannelState, CustodyEvent, LogHash};

use crate::timeline::{IntegrityFinding, MergedTimeline, TimelineNote};

/// Policy knobs for timeline merging.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Page size when the caller does not request one.
    pub page_limit: u32,
    /// Budget for one remote log read; past it the fetch is treated as a
    /// recoverable outage, not a failure.
    pub remote_timeout: Duration,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            page_limit: 25,
            remote_timeout: Duration::from_secs(2),
        }
    }
}

/// Merges the local event mirror with the authoritative consensus log.
pub struct TimelineMerger {
    reader: Arc<dyn LogReader>,
    config: MergeConfig,
}

impl TimelineMerger {
    pub fn new(reader: Arc<dyn LogReader>, config: MergeConfig) -> Self {
        Self { reader, config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Reconcile one page of a batch's custody timeline.
    ///
    /// Expected conditions — unlinked batch, remote outage, sequence gap —
    /// come back as values on the result; this call does not fail.
    pub async fn merge(
        &self,
        channel: Option<&ChannelId>,
        local_events: &[CustodyEvent],
        cursor: Option<&Cursor>,
        limit: Option<u32>,
        order: ScanOrder,
    ) -> MergedTimeline {
        let Some(channel) = channel else {
            debug!("batch has no channel; returning unlinked timeline");
            return MergedTimeline::empty_with_note(TimelineNote::Unlinked);
        };

        let limit = limit
            .unwrap_or(self.config.page_limit)
            .clamp(1, MAX_PAGE_LIMIT);

        let (page, degraded) = match self.fetch_remote(channel, cursor, limit, order).await {
            Ok(page) => (page, None),
            Err(reason) => {
                warn!(
                    channel = %channel,
                    %reason,
                    "remote log read failed; degrading to local-only timeline"
                );
                (LogPage::empty(), Some(reason))
            }
        };

        // Local rows participating in this page: bounded by the remote
        // window when the log answered, otherwise paged the same way the
        // log would have been.
        let local_window: Vec<&CustodyEvent> = if !page.entries.is_empty() {
            let lo = page.entries.iter().map(|e| e.seq).min().unwrap_or(0);
            let hi = page.entries.iter().map(|e| e.seq).max().unwrap_or(0);
            local_events
                .iter()
                .filter(|e| (lo..=hi).contains(&e.seq))
                .collect()
        } else {
            window_local(local_events, cursor, limit, order)
        };

        // Ascending normalization, deduplicated by seq. The remote copy is
        // authoritative for log-assigned fields; the local copy only
        // contributes facility-name enrichment.
        let mut by_seq: BTreeMap<u64, CustodyEvent> = page
            .entries
            .iter()
            .map(|e| (e.seq, e.clone()))
            .collect();
        for &local in &local_window {
            by_seq
                .entry(local.seq)
                .and_modify(|remote| {
                    let merged = CustodyEvent::merged_with_local(remote, local);
                    *remote = merged;
                })
                .or_insert_with(|| local.clone());
        }

        let (integrity, state, by_seq) = if degraded.is_none() {
            self.validate_with_refetch(channel, by_seq, local_events, page.prior_running_hash)
                .await
        } else {
            validate_local_only(by_seq)
        };

        let mut events: Vec<CustodyEvent> = by_seq.into_values().collect();
        if order == ScanOrder::Descending {
            events.reverse();
        }

        let next_cursor = if degraded.is_none() {
            page.next_cursor
        } else if events.len() == limit as usize {
            events.last().map(|e| Cursor::new(e.seq, order))
        } else {
            None
        };

        debug!(
            channel = %channel,
            merged = events.len(),
            degraded = degraded.is_some(),
            integrity = ?integrity,
            "timeline merged"
        );

        MergedTimeline {
            events,
            next_cursor,
            note: degraded.map(|reason| TimelineNote::RemoteDegraded { reason }),
            integrity,
            state,
        }
    }

    /// Fetch a remote page within the configured budget, normalizing all
    /// failure shapes (error, timeout, disordered page) to a reason string.
    async fn fetch_remote(
        &self,
        channel: &ChannelId,
        cursor: Option<&Cursor>,
        limit: u32,
        order: ScanOrder,
    ) -> Result<LogPage, String> {
        let fetch = self.reader.fetch_page(channel, cursor, limit, order);
        let page = match tokio::time::timeout(self.config.remote_timeout, fetch).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => return Err(e.to_string()),
            Err(_) => {
                return Err(format!(
                    "fetch timed out after {:?}",
                    self.config.remote_timeout
                ))
            }
        };
        check_page_shape(&page, order)?;
        Ok(page)
    }

    /// Validate the ascending run; on a sequence gap, re-fetch the missing
    /// range once before reporting. A gap may be a pagination artifact of
    /// the upstream mirror, so it must not be confused with tampering.
    async fn validate_with_refetch(
        &self,
        channel: &ChannelId,
        mut by_seq: BTreeMap<u64, CustodyEvent>,
        local_events: &[CustodyEvent],
        prior: Option<LogHash>,
    ) -> (
        Option<IntegrityFinding>,
        Option<ChannelState>,
        BTreeMap<u64, CustodyEvent>,
    ) {
        let Some(seed) = seed_state(&by_seq, prior) else {
            // Mid-stream run with no declared prior hash: nothing to chain
            // against. The log contract supplies the prior, so this only
            // occurs on malformed upstream data already noted elsewhere.
            return (None, None, by_seq);
        };

        let mut refetched = false;
        loop {
            let ascending: Vec<CustodyEvent> = by_seq.values().cloned().collect();
            match ChainValidator::validate(&ascending, seed) {
                ChainOutcome::Valid(state) => return (None, Some(state), by_seq),
                ChainOutcome::Broken { seq } => {
                    warn!(channel = %channel, seq, "running hash mismatch in custody log");
                    return (Some(IntegrityFinding::Broken { seq }), None, by_seq);
                }
                ChainOutcome::Gap { missing_seq } if !refetched => {
                    refetched = true;
                    let hi = by_seq.keys().next_back().copied().unwrap_or(missing_seq);
                    let span = (hi.saturating_sub(missing_seq) + 1).min(MAX_PAGE_LIMIT as u64);
                    debug!(
                        channel = %channel,
                        missing_seq,
                        span,
                        "sequence gap; re-fetching missing range"
                    );
                    let fill_cursor = Cursor::new(missing_seq - 1, ScanOrder::Ascending);
                    match self
                        .fetch_remote(
                            channel,
                            Some(&fill_cursor),
                            span as u32,
                            ScanOrder::Ascending,
                        )
                        .await
                    {
                        Ok(fill) => {
                            for entry in fill.entries {
                                if entry.seq > hi {
                                    break;
                                }
                                let merged = local_events
                                    .iter()
                                    .find(|l| l.seq == entry.seq)
                                    .map(|l| CustodyEvent::merged_with_local(&entry, l))
                                    .unwrap_or(entry);
                                by_seq.entry(merged.seq).or_insert(merged);
                            }
                        }
                        Err(reason) => {
                            warn!(channel = %channel, %reason, "gap re-fetch failed");
                            return (Some(IntegrityFinding::Gap { missing_seq }), None, by_seq);
                        }
                    }
                }
                ChainOutcome::Gap { missing_seq } => {
                    return (Some(IntegrityFinding::Gap { missing_seq }), None, by_seq);
                }
            }
        }
    }
}

/// Local-only validation for the degraded path. Without a declared prior
/// hash the chain can only be checked when the run starts at genesis.
fn validate_local_only(
    by_seq: BTreeMap<u64, CustodyEvent>,
) -> (
    Option<IntegrityFinding>,
    Option<ChannelState>,
    BTreeMap<u64, CustodyEvent>,
) {
    if by_seq.keys().next() != Some(&1) {
        return (None, None, by_seq);
    }
    let ascending: Vec<CustodyEvent> = by_seq.values().cloned().collect();
    match ChainValidator::validate(&ascending, ChannelState::genesis()) {
        ChainOutcome::Valid(state) => (None, Some(state), by_seq),
        ChainOutcome::Broken { seq } => (Some(IntegrityFinding::Broken { seq }), None, by_seq),
        ChainOutcome::Gap { missing_seq } => {
            (Some(IntegrityFinding::Gap { missing_seq }), None, by_seq)
        }
    }
}

fn seed_state(by_seq: &BTreeMap<u64, CustodyEvent>, prior: Option<LogHash>) -> Option<ChannelState> {
    let first = match by_seq.keys().next() {
        Some(&seq) => seq,
        None => return Some(ChannelState::genesis()),
    };
    if first == 1 {
        Some(ChannelState::genesis())
    } else {
        prior.map(|hash| ChannelState::at(hash, first - 1))
    }
}

fn window_local<'a>(
    local: &'a [CustodyEvent],
    cursor: Option<&Cursor>,
    limit: u32,
    order: ScanOrder,
) -> Vec<&'a CustodyEvent> {
    let mut rows: Vec<&CustodyEvent> = local.iter().collect();
    rows.sort_by_key(|e| e.seq);
    match order {
        ScanOrder::Ascending => {
            let after = cursor.map_or(0, |c| c.last_seq);
            rows.into_iter()
                .filter(|e| e.seq > after)
                .take(limit as usize)
                .collect()
        }
        ScanOrder::Descending => {
            let before = cursor.map_or(u64::MAX, |c| c.last_seq);
            rows.into_iter()
                .rev()
                .filter(|e| e.seq < before)
                .take(limit as usize)
                .collect()
        }
    }
}

fn check_page_shape(page: &LogPage, order: ScanOrder) -> Result<(), String> {
    let ordered = page.entries.windows(2).all(|w| match order {
        ScanOrder::Ascending => w[0].seq < w[1].seq,
        ScanOrder::Descending => w[0].seq > w[1].seq,
    });
    if !ordered {
        return Err("page entries out of sequence order".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use packtrace_ledger::{EventSubmission, InMemoryEventLog, LedgerError};
    use packtrace_types::EventKind;
    use serde_json::json;

    use super::*;

    fn channel() -> ChannelId {
        ChannelId::new("0.0.48211").unwrap()
    }

    fn submission(kind: EventKind, to: Option<&str>) -> EventSubmission {
        EventSubmission {
            kind,
            body: json!({ "op": "custody" }),
            from_facility: None,
            to_facility: to.map(Into::into),
        }
    }

    fn seeded_log(count: u64) -> (InMemoryEventLog, ChannelId) {
        let log = InMemoryEventLog::new();
        let ch = channel();
        for _ in 0..count {
            log.submit(&ch, &submission(EventKind::Handover, None)).unwrap();
        }
        (log, ch)
    }

    async fn remote_events(log: &InMemoryEventLog, ch: &ChannelId) -> Vec<CustodyEvent> {
        log.fetch_page(ch, None, 100, ScanOrder::Ascending)
            .await
            .unwrap()
            .entries
    }

    fn merger(reader: Arc<dyn LogReader>) -> TimelineMerger {
        TimelineMerger::new(reader, MergeConfig::default())
    }

    /// Reader that always fails, for outage tests.
    struct UnreachableReader;

    #[async_trait]
    impl LogReader for UnreachableReader {
        async fn fetch_page(
            &self,
            _channel: &ChannelId,
            _cursor: Option<&Cursor>,
            _limit: u32,
            _order: ScanOrder,
        ) -> Result<LogPage, LedgerError> {
            Err(LedgerError::Unreachable("connection refused".into()))
        }
    }

    /// Reader that never answers within any sane budget.
    struct StalledReader;

    #[async_trait]
    impl LogReader for StalledReader {
        async fn fetch_page(
            &self,
            _channel: &ChannelId,
            _cursor: Option<&Cursor>,
            _limit: u32,
            _order: ScanOrder,
        ) -> Result<LogPage, LedgerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(LogPage::empty())
        }
    }

    /// Reader that drops one sequence number from cursorless pages but
    /// serves cursor-driven range fetches faithfully.
    struct HoleyReader {
        inner: InMemoryEventLog,
        dropped_seq: u64,
        drop_always: bool,
    }

    #[async_trait]
    impl LogReader for HoleyReader {
        async fn fetch_page(
            &self,
            channel: &ChannelId,
            cursor: Option<&Cursor>,
            limit: u32,
            order: ScanOrder,
        ) -> Result<LogPage, LedgerError> {
            let mut page = self.inner.fetch_page(channel, cursor, limit, order).await?;
            if cursor.is_none() || self.drop_always {
                page.entries.retain(|e| e.seq != self.dropped_seq);
            }
            Ok(page)
        }
    }

    /// Reader that returns entries out of order.
    struct DisorderedReader {
        inner: InMemoryEventLog,
    }

    #[async_trait]
    impl LogReader for DisorderedReader {
        async fn fetch_page(
            &self,
            channel: &ChannelId,
            cursor: Option<&Cursor>,
            limit: u32,
            order: ScanOrder,
        ) -> Result<LogPage, LedgerError> {
            let mut page = self.inner.fetch_page(channel, cursor, limit, order).await?;
            page.entries.reverse();
            Ok(page)
        }
    }

    #[tokio::test]
    async fn unlinked_batch_short_circuits() {
        let (log, _ch) = seeded_log(3);
        let m = merger(Arc::new(log));
        let timeline = m.merge(None, &[], None, None, ScanOrder::Ascending).await;
        assert!(timeline.events.is_empty());
        assert_eq!(timeline.note, Some(TimelineNote::Unlinked));
        assert!(timeline.integrity.is_none());
    }

    #[tokio::test]
    async fn clean_remote_merge_validates() {
        let (log, ch) = seeded_log(5);
        let m = merger(Arc::new(log));
        let timeline = m
            .merge(Some(&ch), &[], None, None, ScanOrder::Ascending)
            .await;

        assert_eq!(timeline.events.len(), 5);
        assert!(timeline.note.is_none());
        assert!(timeline.integrity.is_none());
        assert_eq!(timeline.state.unwrap().validated_up_to, Some(5));
    }

    #[tokio::test]
    async fn local_enrichment_survives_merge() {
        let (log, ch) = seeded_log(3);
        let mut locals = remote_events(&log, &ch).await;
        locals[1].to_facility = Some("Main St Pharmacy".into());

        let m = merger(Arc::new(log));
        let timeline = m
            .merge(Some(&ch), &locals, None, None, ScanOrder::Ascending)
            .await;

        assert_eq!(
            timeline.events[1].to_facility.as_deref(),
            Some("Main St Pharmacy")
        );
        assert!(timeline.integrity.is_none());
    }

    #[tokio::test]
    async fn stale_local_hashes_lose_to_remote() {
        let (log, ch) = seeded_log(3);
        let mut locals = remote_events(&log, &ch).await;
        locals[2].running_hash = LogHash::from_raw([0xEE; 32]);

        let m = merger(Arc::new(log));
        let timeline = m
            .merge(Some(&ch), &locals, None, None, ScanOrder::Ascending)
            .await;

        // The authoritative copy wins, so the stale local hash cannot
        // manufacture a chain break.
        assert!(timeline.integrity.is_none());
    }

    #[tokio::test]
    async fn outage_degrades_to_local_only() {
        let (log, ch) = seeded_log(4);
        let locals = remote_events(&log, &ch).await;

        let m = merger(Arc::new(UnreachableReader));
        let timeline = m
            .merge(Some(&ch), &locals, None, None, ScanOrder::Ascending)
            .await;

        assert_eq!(timeline.events.len(), 4);
        assert!(matches!(
            timeline.note,
            Some(TimelineNote::RemoteDegraded { .. })
        ));
        // Local mirror is complete from genesis, so the chain still checks.
        assert!(timeline.integrity.is_none());
        assert_eq!(timeline.state.unwrap().validated_up_to, Some(4));
    }

    #[tokio::test]
    async fn timeout_degrades_to_local_only() {
        let (log, ch) = seeded_log(2);
        let locals = remote_events(&log, &ch).await;

        let m = TimelineMerger::new(
            Arc::new(StalledReader),
            MergeConfig {
                remote_timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );
        let timeline = m
            .merge(Some(&ch), &locals, None, None, ScanOrder::Ascending)
            .await;

        assert_eq!(timeline.events.len(), 2);
        assert!(matches!(
            timeline.note,
            Some(TimelineNote::RemoteDegraded { .. })
        ));
    }

    #[tokio::test]
    async fn disordered_page_degrades() {
        let (log, ch) = seeded_log(3);
        let m = merger(Arc::new(DisorderedReader { inner: log }));
        let timeline = m
            .merge(Some(&ch), &[], None, None, ScanOrder::Ascending)
            .await;

        assert!(timeline.events.is_empty());
        assert!(matches!(
            timeline.note,
            Some(TimelineNote::RemoteDegraded { .. })
        ));
    }

    #[tokio::test]
    async fn gap_is_refetched_and_healed() {
        let (log, ch) = seeded_log(5);
        let m = merger(Arc::new(HoleyReader {
            inner: log,
            dropped_seq: 3,
            drop_always: false,
        }));
        let timeline = m
            .merge(Some(&ch), &[], None, None, ScanOrder::Ascending)
            .await;

        let seqs: Vec<u64> = timeline.events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
        assert!(timeline.integrity.is_none());
        assert_eq!(timeline.state.unwrap().validated_up_to, Some(5));
    }

    #[tokio::test]
    async fn persistent_gap_is_reported_not_invented() {
        let (log, ch) = seeded_log(5);
        let m = merger(Arc::new(HoleyReader {
            inner: log,
            dropped_seq: 3,
            drop_always: true,
        }));
        let timeline = m
            .merge(Some(&ch), &[], None, None, ScanOrder::Ascending)
            .await;

        assert_eq!(
            timeline.integrity,
            Some(IntegrityFinding::Gap { missing_seq: 3 })
        );
        assert!(timeline.state.is_none());
    }

    #[tokio::test]
    async fn broken_chain_is_reported_at_seq() {
        let (log, ch) = seeded_log(4);
        log.corrupt_entry(&ch, 2, LogHash::from_raw([0xEE; 32])).unwrap();

        let m = merger(Arc::new(log));
        let timeline = m
            .merge(Some(&ch), &[], None, None, ScanOrder::Ascending)
            .await;

        assert_eq!(
            timeline.integrity,
            Some(IntegrityFinding::Broken { seq: 2 })
        );
        assert!(timeline.integrity.unwrap().is_tampering());
    }

    #[tokio::test]
    async fn pagination_resumes_from_cursor_mid_stream() {
        let (log, ch) = seeded_log(7);
        let m = merger(Arc::new(log));

        let first = m
            .merge(Some(&ch), &[], None, Some(3), ScanOrder::Ascending)
            .await;
        assert_eq!(first.events.len(), 3);
        let cursor = first.next_cursor.unwrap();

        let second = m
            .merge(Some(&ch), &[], Some(&cursor), Some(3), ScanOrder::Ascending)
            .await;
        let seqs: Vec<u64> = second.events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![4, 5, 6]);
        // Mid-stream pages chain off the prior running hash.
        assert!(second.integrity.is_none());
        assert_eq!(second.state.unwrap().validated_up_to, Some(6));
    }

    #[tokio::test]
    async fn descending_output_keeps_validation_ascending() {
        let (log, ch) = seeded_log(4);
        let m = merger(Arc::new(log));
        let timeline = m
            .merge(Some(&ch), &[], None, None, ScanOrder::Descending)
            .await;

        let seqs: Vec<u64> = timeline.events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![4, 3, 2, 1]);
        assert!(timeline.integrity.is_none());
        assert_eq!(timeline.latest_event().unwrap().seq, 4);
    }

    #[tokio::test]
    async fn degraded_pagination_windows_local_rows() {
        let (log, ch) = seeded_log(5);
        let locals = remote_events(&log, &ch).await;

        let m = merger(Arc::new(UnreachableReader));
        let first = m
            .merge(Some(&ch), &locals, None, Some(2), ScanOrder::Ascending)
            .await;
        assert_eq!(
            first.events.iter().map(|e| e.seq).collect::<Vec<_>>(),
            vec![1, 2]
        );
        let cursor = first.next_cursor.unwrap();

        let second = m
            .merge(Some(&ch), &locals, Some(&cursor), Some(2), ScanOrder::Ascending)
            .await;
        assert_eq!(
            second.events.iter().map(|e| e.seq).collect::<Vec<_>>(),
            vec![3, 4]
        );
    }
}
