//! # bplist-codec - Binary Property List Codec
//!
//! ## Purpose
//!
//! Encoding and decoding rules for the `bplist00` binary container format: a
//! compact, self-describing serialization of nested scalars, byte blobs,
//! strings, ordered lists, and string-keyed ordered maps. The format stores
//! an 8-byte magic literal, a section of type-tagged objects, a dense offset
//! table translating object indices to byte positions, and a fixed 32-byte
//! trailer describing how to locate that table.
//!
//! ## Architecture Role
//!
//! ```text
//! Callers → [Value graph] → encoder → complete byte stream
//!     ↑          ↓                          ↓
//! Typed      Tagged Union              magic | objects |
//! Accessors  (closed enum)             offset table | trailer
//!     ↑                                      ↓
//! Callers ← [Value graph] ← decoder ← byte slice / reader
//! ```
//!
//! Containers on the wire refer to their children by offset-table index, not
//! byte offset; the codec dereferences every reference through the table. A
//! decode returns a fully resolved graph or an error, never a partial value;
//! an encode produces a complete, independently re-decodable buffer.
//!
//! ## What This Crate Contains
//! - `Value`: the tagged-union data model with typed accessors
//! - `decode`/`decode_from`: magic + trailer validation, offset-table
//!   resolution, recursive object decoding
//! - `encode`/`encode_to`: pre-pass slot counting, reserve/back-fill
//!   reference patching, offset table and trailer emission
//! - `CodecError`: the failure taxonomy (bad magic, unsupported tags,
//!   malformed references, truncation)
//!
//! ## What This Crate Does NOT Contain
//! - The XML property list variant (a distinct, simpler codec)
//! - Domain-level record mapping, file/network front ends
//! - Streaming or incremental decoding; graphs are finite and in-memory
//!
//! ## Examples
//!
//! ```rust
//! use bplist_codec::{decode, encode, Value};
//!
//! let track = Value::Dict(vec![
//!     ("Name".to_string(), Value::Text("Goodbye".into())),
//!     ("Track ID".to_string(), Value::Int(2934)),
//!     ("Clean".to_string(), Value::Bool(true)),
//! ]);
//!
//! let bytes = encode(&track)?;
//! assert_eq!(decode(&bytes)?, track);
//! # Ok::<(), bplist_codec::CodecError>(())
//! ```

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod marker;
pub mod value;
pub mod width;

// Re-export the codec surface for convenience
pub use constants::{APPLE_EPOCH_OFFSET_SECS, MAGIC, TRAILER_SIZE};
pub use decoder::{decode, decode_from};
pub use encoder::{encode, encode_to};
pub use error::{CodecError, CodecResult};
pub use value::Value;
