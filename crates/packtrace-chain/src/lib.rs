//! Hash-chain primitives for Packtrace custody logs.
//!
//! Provides the domain-separated BLAKE3 running-hash combine and the
//! page-resumable chain validator. A broken chain and a sequence gap are
//! reported as distinct outcomes: a gap may be a pagination artifact the
//! caller can repair by fetching the missing range, while a break
//! invalidates all trust past the point of mismatch.

pub mod running;
pub mod validate;

pub use running::running_hash;
pub use validate::{ChainOutcome, ChainValidator};
