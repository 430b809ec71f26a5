//! Contract-call ABI encoding.
//!
//! Turns a method definition plus an ordered argument list into calldata:
//! a 4-byte selector followed by the head/tail word encoding of the
//! arguments. Encoding is deterministic, two calls with equal inputs
//! produce bit-identical output.

mod encode;
mod types;

pub use encode::{encode_call, EncodingError};
pub use types::{Function, ParamType, Token};

/// Number of bytes in one encoded argument word.
pub const WORD_LEN: usize = 32;
