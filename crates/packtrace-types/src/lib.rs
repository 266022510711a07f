//! Foundation types for Packtrace.
//!
//! This crate provides the identifying, temporal, and event types used
//! throughout the Packtrace system. Every other Packtrace crate depends on
//! `packtrace-types`.
//!
//! # Key Types
//!
//! - [`Gtin`] — validated 14-digit trade item number with mod-10 check digit
//! - [`LotCode`] / [`SerialNumber`] — bounded alphanumeric code fields
//! - [`ExpiryDate`] — calendar expiry date with a YYMMDD wire form
//! - [`PackCode`] — the identifying fields a structured code carries
//! - [`BatchDescriptor`] — a pack code plus out-of-band quantity
//! - [`CustodyEvent`] — one immutable entry in a channel's custody log
//! - [`LogHash`] — 32-byte payload/running hash with hex helpers
//! - [`ChannelState`] — request-scoped chain validation resume point

pub mod batch;
pub mod channel;
pub mod error;
pub mod event;
pub mod expiry;
pub mod fields;
pub mod gtin;
pub mod hash;

pub use batch::{BatchDescriptor, BatchId, PackCode};
pub use channel::{ChannelId, ChannelState};
pub use error::TypeError;
pub use event::{CustodyEvent, EventKind};
pub use expiry::ExpiryDate;
pub use fields::{LotCode, SerialNumber, GROUP_SEPARATOR};
pub use gtin::Gtin;
pub use hash::LogHash;
