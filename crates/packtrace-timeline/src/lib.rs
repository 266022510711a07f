//! Custody timeline merger for Packtrace.
//!
//! Reconciles the local mirror of a batch's custody events with one page of
//! the authoritative consensus log:
//!
//! - deduplicates by sequence number (remote wins for log-assigned fields,
//!   local wins for facility-name enrichment)
//! - validates the hash chain over the ascending normalization, re-fetching
//!   a missing range once before reporting a gap
//! - degrades to local-only data with an advisory note when the log is
//!   unreachable — an outage must never block a scan
//! - produces a pagination cursor that encodes an absolute sequence
//!   position, stable under concurrent appends
//!
//! The merge result is a plain value carrying optional advisory and
//! integrity findings; expected conditions (unlinked batch, outage, gap)
//! are not exception paths.

pub mod merger;
pub mod timeline;

pub use merger::{MergeConfig, TimelineMerger};
pub use timeline::{IntegrityFinding, MergedTimeline, TimelineNote};
