//! # Binary Plist Decoder
//!
//! ## Purpose
//!
//! Validates the magic header, parses the fixed trailer, materializes the
//! offset table, then recursively resolves the root object into a
//! [`Value`] graph. Containers on the wire hold object references (indices
//! into the offset table), not raw byte offsets, so every reference is
//! dereferenced through the table before reading.
//!
//! ## Architecture Role
//!
//! ```text
//! Raw Bytes → magic check → trailer → offset table → resolve(root)
//!                                                         ↓
//!                                              recursive reference
//!                                              dereference → Value
//! ```
//!
//! No object caching is performed: repeated references cause repeated decode
//! work, which is acceptable for the modest graphs this format carries. All
//! reads are bounds-checked; a reference outside the table is
//! [`CodecError::MalformedReference`], short input is [`CodecError::Truncated`].

use crate::constants::{MAGIC, MIN_STREAM_SIZE, TRAILER_SIZE};
use crate::error::{CodecError, CodecResult};
use crate::marker::{self, TypeTag, COUNT_OVERFLOW, NIBBLE_FALSE, NIBBLE_NULL, NIBBLE_TRUE};
use crate::value::Value;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;
use tracing::{debug, trace};

/// Decode a complete binary property list from a byte slice
///
/// Fails with a decode error rather than returning a partial value.
///
/// # Errors
/// - [`CodecError::BadMagic`] - the first 8 bytes are not `b"bplist00"`
/// - [`CodecError::Truncated`] - the input ends before a declared field
/// - [`CodecError::UnsupportedTag`] - an object marker has an unknown type tag
/// - [`CodecError::MalformedReference`] - a reference points outside the offset table
pub fn decode(data: &[u8]) -> CodecResult<Value> {
    if data.len() < MAGIC.len() {
        return Err(CodecError::Truncated {
            need: MAGIC.len(),
            got: data.len(),
        });
    }
    if data[..MAGIC.len()] != MAGIC {
        let mut actual = [0u8; 8];
        actual.copy_from_slice(&data[..MAGIC.len()]);
        return Err(CodecError::BadMagic {
            expected: MAGIC,
            actual,
        });
    }
    if data.len() < MIN_STREAM_SIZE {
        return Err(CodecError::Truncated {
            need: MIN_STREAM_SIZE,
            got: data.len(),
        });
    }

    let trailer = Trailer::parse(data)?;
    debug!(
        len = data.len(),
        objects = trailer.object_count,
        ref_width = trailer.ref_width,
        "decoding binary plist"
    );
    let offsets = read_offset_table(data, &trailer)?;
    let decoder = Decoder {
        data,
        offsets,
        ref_width: trailer.ref_width,
    };
    decoder.resolve(trailer.root_index)
}

/// Read a seekless source to EOF, then decode the buffered bytes
///
/// I/O failures propagate unchanged; the codec does not retry.
pub fn decode_from<R: Read>(mut reader: R) -> CodecResult<Value> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode(&data)
}

/// Fixed 32-byte structure at the end of the stream describing how to locate
/// and interpret the offset table
#[derive(Debug)]
struct Trailer {
    offset_entry_width: usize,
    ref_width: usize,
    object_count: u64,
    root_index: u64,
    table_start: u64,
}

impl Trailer {
    /// Parse the last 32 bytes of the input; caller has verified the length
    fn parse(data: &[u8]) -> CodecResult<Trailer> {
        let tail = &data[data.len() - TRAILER_SIZE..];
        let offset_entry_width = tail[6] as usize;
        let ref_width = tail[7] as usize;
        if !(1..=8).contains(&offset_entry_width) {
            return Err(CodecError::InvalidTrailer(
                "offset-table entry width must be 1..=8",
            ));
        }
        if !(1..=8).contains(&ref_width) {
            return Err(CodecError::InvalidTrailer(
                "object reference width must be 1..=8",
            ));
        }
        let mut rdr = &tail[8..];
        let object_count = rdr.read_u64::<BigEndian>()?;
        let root_index = rdr.read_u64::<BigEndian>()?;
        let table_start = rdr.read_u64::<BigEndian>()?;
        Ok(Trailer {
            offset_entry_width,
            ref_width,
            object_count,
            root_index,
            table_start,
        })
    }
}

/// Read `object_count` fixed-width big-endian entries at the trailer-declared
/// table position; entry `i` is the absolute byte offset of object `i`
fn read_offset_table(data: &[u8], trailer: &Trailer) -> CodecResult<Vec<u64>> {
    // Every object occupies at least its marker byte, so a count beyond the
    // input length cannot be satisfied.
    if trailer.object_count > data.len() as u64 {
        return Err(CodecError::Truncated {
            need: trailer.object_count as usize,
            got: data.len(),
        });
    }
    let count = trailer.object_count as usize;
    let start = usize::try_from(trailer.table_start)
        .ok()
        .filter(|&start| start <= data.len())
        .ok_or(CodecError::Truncated {
            need: data.len().saturating_add(1),
            got: data.len(),
        })?;

    let mut offsets = Vec::with_capacity(count);
    for slot in 0..count {
        offsets.push(read_be_uint(
            data,
            start + slot * trailer.offset_entry_width,
            trailer.offset_entry_width,
        )?);
    }
    Ok(offsets)
}

/// Bounds-checked big-endian unsigned read of 1..=8 bytes
fn read_be_uint(data: &[u8], offset: usize, width: usize) -> CodecResult<u64> {
    let mut rdr = slice(data, offset, width)?;
    Ok(rdr.read_uint::<BigEndian>(width)?)
}

/// Bounds-checked subslice, `Truncated` on overrun
fn slice(data: &[u8], offset: usize, len: usize) -> CodecResult<&[u8]> {
    let end = offset.checked_add(len).ok_or(CodecError::Truncated {
        need: usize::MAX,
        got: data.len(),
    })?;
    data.get(offset..end).ok_or(CodecError::Truncated {
        need: end,
        got: data.len(),
    })
}

/// State for one decode call: the input, the materialized offset table, and
/// the single file-global reference width
struct Decoder<'a> {
    data: &'a [u8],
    offsets: Vec<u64>,
    ref_width: usize,
}

impl Decoder<'_> {
    /// Dereference an object index through the offset table and read it
    fn resolve(&self, index: u64) -> CodecResult<Value> {
        let count = self.offsets.len() as u64;
        let slot = usize::try_from(index)
            .ok()
            .filter(|&slot| slot < self.offsets.len())
            .ok_or(CodecError::MalformedReference { index, count })?;
        // An object header must lie inside the input; rejecting here keeps
        // all downstream offset arithmetic within the slice length.
        let offset = usize::try_from(self.offsets[slot])
            .ok()
            .filter(|&offset| offset < self.data.len())
            .ok_or(CodecError::Truncated {
                need: self.data.len().saturating_add(1),
                got: self.data.len(),
            })?;
        trace!(index, offset, "resolving object");
        self.read_object(offset)
    }

    /// Read one object header at `offset` and dispatch on its type tag
    fn read_object(&self, offset: usize) -> CodecResult<Value> {
        let marker = self.byte(offset)?;
        let (high, low) = marker::split(marker);
        let tag =
            TypeTag::try_from(high).map_err(|_| CodecError::UnsupportedTag { marker, offset })?;

        match tag {
            TypeTag::NullOrBool => match low {
                NIBBLE_NULL => Ok(Value::Null),
                NIBBLE_FALSE => Ok(Value::Bool(false)),
                NIBBLE_TRUE => Ok(Value::Bool(true)),
                _ => Err(CodecError::UnsupportedTag { marker, offset }),
            },
            TypeTag::Integer => {
                let width = 1usize << low;
                if width > 8 {
                    return Err(CodecError::UnsupportedTag { marker, offset });
                }
                // Narrow widths only ever hold trimmed non-negative values;
                // negatives always occupy the full 8 two's-complement bytes.
                let value = if width == 8 {
                    let mut rdr = slice(self.data, offset + 1, 8)?;
                    rdr.read_i64::<BigEndian>()?
                } else {
                    read_be_uint(self.data, offset + 1, width)? as i64
                };
                Ok(Value::Int(value))
            }
            TypeTag::Real => {
                let width = 1usize << low;
                match width {
                    4 => {
                        let mut rdr = slice(self.data, offset + 1, 4)?;
                        Ok(Value::Real(rdr.read_f32::<BigEndian>()? as f64))
                    }
                    8 => {
                        let mut rdr = slice(self.data, offset + 1, 8)?;
                        Ok(Value::Real(rdr.read_f64::<BigEndian>()?))
                    }
                    _ => Err(CodecError::UnsupportedTag { marker, offset }),
                }
            }
            TypeTag::Date => {
                // Fixed 8-byte payload; the nibble is always log2(8).
                if low != 3 {
                    return Err(CodecError::UnsupportedTag { marker, offset });
                }
                let mut rdr = slice(self.data, offset + 1, 8)?;
                Ok(Value::Timestamp(rdr.read_f64::<BigEndian>()?))
            }
            TypeTag::Data => {
                let (count, start) = self.read_count(offset, low)?;
                Ok(Value::Bytes(slice(self.data, start, count)?.to_vec()))
            }
            TypeTag::AsciiString => {
                let (count, start) = self.read_count(offset, low)?;
                let raw = slice(self.data, start, count)?;
                let text = std::str::from_utf8(raw)
                    .map_err(|_| CodecError::InvalidString { offset: start })?;
                Ok(Value::Text(text.to_string()))
            }
            TypeTag::Utf16String => {
                let (count, start) = self.read_count(offset, low)?;
                let mut rdr = slice(self.data, start, count * 2)?;
                let mut units = Vec::with_capacity(count);
                for _ in 0..count {
                    units.push(rdr.read_u16::<BigEndian>()?);
                }
                let text = String::from_utf16(&units)
                    .map_err(|_| CodecError::InvalidString { offset: start })?;
                Ok(Value::Text(text))
            }
            TypeTag::Array => {
                let (count, start) = self.read_count(offset, low)?;
                let mut items = Vec::with_capacity(count);
                for slot in 0..count {
                    let index = self.reference(start + slot * self.ref_width)?;
                    items.push(self.resolve(index)?);
                }
                Ok(Value::Array(items))
            }
            TypeTag::Dict => {
                let (count, start) = self.read_count(offset, low)?;
                let values_start = start + count * self.ref_width;
                let mut entries = Vec::with_capacity(count);
                for slot in 0..count {
                    let key_index = self.reference(start + slot * self.ref_width)?;
                    let value_index = self.reference(values_start + slot * self.ref_width)?;
                    let key = match self.resolve(key_index)? {
                        Value::Text(key) => key,
                        _ => return Err(CodecError::NonStringKey { index: key_index }),
                    };
                    entries.push((key, self.resolve(value_index)?));
                }
                Ok(Value::Dict(entries))
            }
        }
    }

    /// Element count of a variable-length object: the low nibble inline, or
    /// the sentinel 15 followed by a nested integer object holding the true
    /// count. Returns `(count, payload_start)`.
    fn read_count(&self, marker_offset: usize, low: u8) -> CodecResult<(usize, usize)> {
        let after = marker_offset + 1;
        if low != COUNT_OVERFLOW {
            return Ok((low as usize, after));
        }
        let marker = self.byte(after)?;
        let (high, nibble) = marker::split(marker);
        if !matches!(TypeTag::try_from(high), Ok(TypeTag::Integer)) {
            return Err(CodecError::UnsupportedTag {
                marker,
                offset: after,
            });
        }
        let width = 1usize << nibble;
        if width > 8 {
            return Err(CodecError::UnsupportedTag {
                marker,
                offset: after,
            });
        }
        let count = read_be_uint(self.data, after + 1, width)?;
        // Same argument as the offset table: a count beyond the input length
        // cannot have a complete payload behind it.
        if count > self.data.len() as u64 {
            return Err(CodecError::Truncated {
                need: count as usize,
                got: self.data.len(),
            });
        }
        Ok((count as usize, after + 1 + width))
    }

    fn reference(&self, offset: usize) -> CodecResult<u64> {
        read_be_uint(self.data, offset, self.ref_width)
    }

    fn byte(&self, offset: usize) -> CodecResult<u8> {
        self.data
            .get(offset)
            .copied()
            .ok_or(CodecError::Truncated {
                need: offset.saturating_add(1),
                got: self.data.len(),
            })
    }
}
