//! Codec-level errors for binary property list processing
//!
//! Each error variant carries specific context about what went wrong and what
//! was expected, so failures can be diagnosed without re-parsing the input.
//! There is no partial-success mode: decode returns a fully resolved graph or
//! one of these errors, encode produces a complete buffer or fails.

use thiserror::Error;

/// Decode/encode errors with detailed context
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid magic: expected {expected:02x?}, got {actual:02x?}")]
    BadMagic { expected: [u8; 8], actual: [u8; 8] },

    #[error("truncated input: need {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },

    #[error("unsupported object marker {marker:#04x} at offset {offset}")]
    UnsupportedTag { marker: u8, offset: usize },

    #[error("object reference {index} outside offset table of {count} entries")]
    MalformedReference { index: u64, count: u64 },

    #[error("dictionary key object {index} is not a string")]
    NonStringKey { index: u64 },

    #[error("invalid string payload at offset {offset}")]
    InvalidString { offset: usize },

    #[error("invalid trailer: {0}")]
    InvalidTrailer(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
