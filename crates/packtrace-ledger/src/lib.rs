//! Consensus log boundary for Packtrace.
//!
//! The append-only custody log lives on an external consensus network;
//! submission (write side) is out of scope for this core. This crate
//! specifies the read contract the timeline merger consumes:
//!
//! - [`LogReader`] — one page of ordered entries per call
//! - [`LogPage`] — entries plus resume data (cursor, prior running hash)
//! - [`Cursor`] — opaque resumable position encoding an absolute sequence
//!   number and direction, never an offset
//!
//! [`InMemoryEventLog`] implements the contract for tests and embedding and
//! mirrors the external write API's shape: `submit` returns the assigned
//! sequence number and running hash.

pub mod cursor;
pub mod error;
pub mod memory;
pub mod page;
pub mod traits;

pub use cursor::{Cursor, ScanOrder};
pub use error::LedgerError;
pub use memory::{EventSubmission, InMemoryEventLog};
pub use page::LogPage;
pub use traits::LogReader;

/// Hard cap on entries per fetched page.
pub const MAX_PAGE_LIMIT: u32 = 100;
