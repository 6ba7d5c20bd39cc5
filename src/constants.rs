//! # Format Constants - bplist00 Core Constants
//!
//! ## Purpose
//!
//! Central registry of wire-level constants shared by the decoder and encoder.
//! These values define the on-disk format and must remain stable for backward
//! compatibility with files produced by other conforming encoders.

/// Magic literal occupying the first 8 bytes of every binary property list
///
/// Decoding aborts with [`CodecError::BadMagic`](crate::CodecError::BadMagic)
/// when the input does not start with this exact sequence. There is no version
/// negotiation beyond the literal itself.
pub const MAGIC: [u8; 8] = *b"bplist00";

/// Size in bytes of the fixed trailer at the end of the stream
///
/// Layout: 6 reserved bytes, 1 byte offset-table entry width, 1 byte object
/// reference width, then three big-endian u64 fields: object count, root
/// object index, and the absolute offset of the offset table.
pub const TRAILER_SIZE: usize = 32;

/// Seconds between the Unix epoch (1970-01-01) and the Apple epoch (2001-01-01)
///
/// Timestamp objects store seconds relative to 2001-01-01T00:00:00Z. This
/// offset is part of the wire contract and must be exact.
pub const APPLE_EPOCH_OFFSET_SECS: f64 = 978_307_200.0;

/// Smallest input that can hold both the magic and the trailer
pub const MIN_STREAM_SIZE: usize = MAGIC.len() + TRAILER_SIZE;
