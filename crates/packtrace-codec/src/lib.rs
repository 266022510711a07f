//! Structured-code codec for Packtrace.
//!
//! Deterministic, stateless encode/decode between a typed batch descriptor
//! and the delimited Application-Identifier string printed on a pack:
//!
//! ```text
//! 01<gtin14>17<yymmdd>10<lot>[<GS>21<serial>]
//! ```
//!
//! Encoding also renders the human-readable line shown under the symbol.
//! Decoding tolerates an absent serial and the presence or absence of a
//! trailing group separator. Recovery of OCR artifacts is out of scope.

pub mod codec;
pub mod error;

pub use codec::{PackCodec, StructuredCode};
pub use error::CodecError;
