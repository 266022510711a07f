use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use packtrace_codec::PackCodec;
use packtrace_ledger::{Cursor, LogReader, ScanOrder};
use packtrace_store::{BatchRecord, BatchStore, StoreError};
use packtrace_timeline::{IntegrityFinding, MergedTimeline, TimelineMerger, TimelineNote};
use packtrace_types::{CustodyEvent, PackCode};

use crate::config::VerifyConfig;
use crate::result::{CustodyEventView, PackCodeView, VerificationResult, VerifyStatus};

/// Caller-supplied pagination context for one verification request.
#[derive(Clone, Debug, Default)]
pub struct VerifyContext {
    /// Opaque cursor token from a previous result's `next_cursor`.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub order: Option<ScanOrder>,
}

/// Top-level verification engine.
///
/// Holds only configuration and the read boundaries; every `verify` call
/// is self-contained, writes nothing, and shares no mutable state with
/// concurrent calls.
pub struct VerificationEngine {
    store: Arc<dyn BatchStore>,
    merger: TimelineMerger,
    config: VerifyConfig,
}

impl VerificationEngine {
    pub fn new(
        store: Arc<dyn BatchStore>,
        reader: Arc<dyn LogReader>,
        config: VerifyConfig,
    ) -> Self {
        let merger = TimelineMerger::new(reader, config.merge_config());
        Self {
            store,
            merger,
            config,
        }
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify a raw scanned code.
    ///
    /// Deterministic given identical inputs and log state. Faults become
    /// statuses: the signature never fails.
    pub async fn verify(&self, raw: &str, ctx: &VerifyContext) -> VerificationResult {
        let code = match PackCodec::decode(raw) {
            Ok(code) => code,
            Err(e) => {
                debug!(reason = e.reason_code(), "scan rejected by codec");
                return VerificationResult::validation_error(&e);
            }
        };

        let cursor = match ctx.cursor.as_deref().map(Cursor::parse).transpose() {
            Ok(cursor) => cursor,
            Err(e) => {
                debug!(error = %e, "rejected pagination cursor");
                return VerificationResult::internal_error("InvalidCursor");
            }
        };
        let order = ctx.order.unwrap_or_default();

        let batch = match self.read_store(self.store.find_batch(&code)).await {
            Ok(batch) => batch,
            Err(reason) => {
                warn!(%reason, "batch lookup failed");
                return VerificationResult::internal_error("StoreUnavailable");
            }
        };
        let Some(batch) = batch else {
            debug!(gtin = %code.gtin, "no batch matches scanned code");
            return VerificationResult::unknown(&code);
        };

        if !batch.descriptor.pack_code().identifies_same_batch(&code) {
            debug!(batch = %batch.id, "scanned fields do not match stored batch");
            return VerificationResult {
                status: VerifyStatus::Mismatch,
                message: "Pack details do not match the registered batch.".into(),
                code: Some(PackCodeView::from_code(&code)),
                channel: batch.channel.clone(),
                ..VerificationResult::idle()
            };
        }

        let locals = match self.read_store(self.store.list_local_events(&batch.id)).await {
            Ok(rows) => rows,
            Err(reason) => {
                warn!(batch = %batch.id, %reason, "local event read failed");
                return VerificationResult::internal_error("StoreUnavailable");
            }
        };

        let merged = self
            .merger
            .merge(batch.channel.as_ref(), &locals, cursor.as_ref(), ctx.limit, order)
            .await;

        conclude(&code, &batch, &locals, merged)
    }

    /// Run a store read within the configured budget. The store is local
    /// infrastructure: unlike the remote log there is no degraded answer
    /// without it, so a fault here becomes the `error` status.
    async fn read_store<T, F>(&self, fut: F) -> Result<T, String>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "store read timed out after {:?}",
                self.config.store_timeout
            )),
        }
    }
}

/// Derive the terminal status from the matched batch and merged timeline.
///
/// Precedence: a recall verdict overrides integrity findings — a recalled
/// batch must read as recalled even when its log also fails validation.
/// Only a proven running-hash break downgrades trust to `mismatch`; an
/// unfilled gap is incomplete data and is surfaced without flipping the
/// status.
fn conclude(
    code: &PackCode,
    batch: &BatchRecord,
    locals: &[CustodyEvent],
    merged: MergedTimeline,
) -> VerificationResult {
    let recalled = merged
        .events
        .iter()
        .chain(locals.iter())
        .max_by_key(|e| e.seq)
        .map(|e| e.kind.is_recall())
        .unwrap_or(false);
    let chain_broken = matches!(merged.integrity, Some(IntegrityFinding::Broken { .. }));

    let (status, message) = if recalled {
        (
            VerifyStatus::Recalled,
            "This batch has been recalled. Do not dispense.",
        )
    } else if chain_broken {
        (
            VerifyStatus::Mismatch,
            "The custody log for this batch failed its integrity check.",
        )
    } else {
        (
            VerifyStatus::Genuine,
            "Pack verified: the custody chain is intact.",
        )
    };

    let (advisory, timeline_error) = match &merged.note {
        Some(TimelineNote::Unlinked) => (
            Some("No custody log is linked to this batch yet.".to_string()),
            None,
        ),
        Some(TimelineNote::RemoteDegraded { .. }) => (
            None,
            Some(
                "The custody log was unreachable; showing locally recorded events only."
                    .to_string(),
            ),
        ),
        None => (None, None),
    };

    debug!(
        batch = %batch.id,
        status = %status,
        events = merged.events.len(),
        integrity = ?merged.integrity,
        "verification concluded"
    );

    VerificationResult {
        status,
        message: message.into(),
        reason_code: None,
        code: Some(PackCodeView::from_code(code)),
        channel: batch.channel.clone(),
        timeline: merged
            .events
            .iter()
            .map(CustodyEventView::from_event)
            .collect(),
        next_cursor: merged.next_cursor.and_then(|c| c.token().ok()),
        advisory,
        timeline_error,
        integrity_error: merged.integrity,
    }
}
