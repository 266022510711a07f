//! Verification engine for Packtrace.
//!
//! The top-level entry point for turning a raw scanned code into a trust
//! verdict. One [`VerificationEngine::verify`] call decodes the code, looks
//! up the local batch record, reconciles the custody timeline against the
//! consensus log, and derives a terminal status:
//!
//! `genuine` | `unknown` | `mismatch` | `recalled` | `error`
//!
//! The call is infallible at the signature — faults become statuses with
//! reason codes, and a consensus log outage degrades to locally recorded
//! data rather than blocking the scan. Results carry a privacy projection:
//! serial numbers are masked before anything leaves the engine.

pub mod actor;
pub mod config;
pub mod engine;
pub mod result;

pub use actor::{role_for, ActorRole};
pub use config::VerifyConfig;
pub use engine::{VerificationEngine, VerifyContext};
pub use result::{CustodyEventView, PackCodeView, VerificationResult, VerifyStatus};

// Re-export the subsystem surface callers need alongside the engine.
pub use packtrace_codec::{CodecError, PackCodec, StructuredCode};
pub use packtrace_ledger::{Cursor, LogReader, ScanOrder};
pub use packtrace_store::{BatchRecord, BatchStore};
pub use packtrace_timeline::{IntegrityFinding, MergedTimeline, TimelineNote};
pub use packtrace_types::{BatchDescriptor, CustodyEvent, EventKind, PackCode};
