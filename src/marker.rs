//! # Object Header Encoding - Marker Byte Dispatch
//!
//! ## Purpose
//!
//! Every object in the stream begins with one marker byte: the high nibble is
//! the type tag, the low nibble is either an inline count/size (0-14) or the
//! sentinel 15 meaning "the true count follows as a nested integer object".
//! Modeling the tag as a closed enum makes decoder and encoder dispatch
//! exhaustive: a tag that exists but is not handled is a compile error, and a
//! tag that does not exist becomes a typed
//! [`UnsupportedTag`](crate::CodecError::UnsupportedTag) error instead of a
//! panic.

use num_enum::TryFromPrimitive;

/// High-nibble type tag of an object marker byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum TypeTag {
    /// Null or boolean; the low nibble selects the variant (see the `NIBBLE_*` constants)
    NullOrBool = 0x0,
    /// Big-endian integer, `2^nibble` payload bytes
    Integer = 0x1,
    /// Big-endian IEEE-754 float, `2^nibble` payload bytes (4 or 8)
    Real = 0x2,
    /// Seconds since the Apple epoch, fixed 8-byte big-endian f64
    Date = 0x3,
    /// Raw byte blob
    Data = 0x4,
    /// ASCII text, one byte per character
    AsciiString = 0x5,
    /// UTF-16BE text, count is the code-unit count (not bytes)
    Utf16String = 0x6,
    /// Ordered list of object references
    Array = 0xA,
    /// String-keyed map: count key references followed by count value references
    Dict = 0xD,
}

/// Low nibble of a `NullOrBool` marker encoding Null
pub const NIBBLE_NULL: u8 = 0x0;
/// Low nibble of a `NullOrBool` marker encoding `false`
pub const NIBBLE_FALSE: u8 = 0x8;
/// Low nibble of a `NullOrBool` marker encoding `true`
pub const NIBBLE_TRUE: u8 = 0x9;

/// Low-nibble sentinel: the real count follows as a nested integer object
pub const COUNT_OVERFLOW: u8 = 0xF;

/// Largest count that fits inline in the low nibble
pub const MAX_INLINE_COUNT: usize = 14;

/// Pack a type tag and low nibble into one marker byte
#[inline]
pub fn pack(tag: TypeTag, nibble: u8) -> u8 {
    ((tag as u8) << 4) | (nibble & 0x0F)
}

/// Split a marker byte into (high nibble, low nibble)
#[inline]
pub fn split(marker: u8) -> (u8, u8) {
    (marker >> 4, marker & 0x0F)
}
