//! # Binary Plist Encoder
//!
//! ## Purpose
//!
//! Serializes a [`Value`] graph into a complete, independently re-decodable
//! byte sequence. A pre-pass counts the total object slots, which fixes the
//! single file-global reference width before any object is written. The
//! stream is then built in an in-memory buffer: containers write their count
//! header, reserve zeroed space for their reference slots, write their
//! children, and back-fill the reserved region with the children's assigned
//! offset-table indices. Because the back-fill is a plain slice write into
//! the buffer, the destination sink needs no seek support and a failed encode
//! never leaves a truncated stream behind.
//!
//! ## Architecture Role
//!
//! ```text
//! Value graph → count pre-pass → magic + objects (reserve/back-fill)
//!                                        ↓
//!                              offset table + trailer → Vec<u8>
//! ```
//!
//! The offset table is carried in an explicit encoder context threaded
//! through the recursion; every object visited appends its byte position and
//! takes the next table index at visit time, root first at index 0.

use crate::constants::MAGIC;
use crate::error::CodecResult;
use crate::marker::{
    self, TypeTag, COUNT_OVERFLOW, MAX_INLINE_COUNT, NIBBLE_FALSE, NIBBLE_NULL, NIBBLE_TRUE,
};
use crate::value::Value;
use crate::width::{min_byte_width, pow2_width, regulate, regulate_real};
use std::io::Write;
use tracing::debug;

/// Encode a value graph into a complete binary property list
///
/// On success the buffer contains magic, objects, offset table, and trailer,
/// ready to decode with [`decode`](crate::decode).
///
/// # Panics
/// Panics if the number of offset-table entries produced by the traversal
/// diverges from the pre-pass count. That is an internal traversal bug, not
/// bad input, so it is asserted rather than surfaced as a [`CodecError`].
///
/// [`CodecError`]: crate::CodecError
pub fn encode(value: &Value) -> CodecResult<Vec<u8>> {
    let total = count_objects(value);
    let ref_width = min_byte_width(total as u64);
    debug!(objects = total, ref_width, "encoding binary plist");

    let mut encoder = Encoder {
        buf: Vec::new(),
        offsets: Vec::with_capacity(total),
        ref_width,
    };
    encoder.buf.extend_from_slice(&MAGIC);
    encoder.write_object(value);
    assert_eq!(
        encoder.offsets.len(),
        total,
        "offset table diverged from pre-pass object count"
    );

    let Encoder {
        mut buf, offsets, ..
    } = encoder;
    let table_start = buf.len() as u64;
    let largest = offsets.iter().copied().max().unwrap_or(0);
    let entry_width = min_byte_width(largest);
    for &offset in &offsets {
        put_be_uint(&mut buf, offset, entry_width);
    }

    buf.extend_from_slice(&[0u8; 6]);
    buf.push(entry_width as u8);
    buf.push(ref_width as u8);
    buf.extend_from_slice(&(offsets.len() as u64).to_be_bytes());
    buf.extend_from_slice(&0u64.to_be_bytes()); // root object index
    buf.extend_from_slice(&table_start.to_be_bytes());
    Ok(buf)
}

/// Encode a value graph and flush the finished buffer to `writer` in one write
///
/// The sink sees either the complete stream or nothing; I/O failures
/// propagate unchanged.
pub fn encode_to<W: Write>(value: &Value, mut writer: W) -> CodecResult<()> {
    let buf = encode(value)?;
    writer.write_all(&buf)?;
    Ok(())
}

/// Total offset-table slots a graph will occupy: scalars one each, an array
/// one plus its children, a dict one plus one per key plus its value subtrees
fn count_objects(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(count_objects).sum::<usize>(),
        Value::Dict(entries) => {
            1 + entries.len() + entries.iter().map(|(_, v)| count_objects(v)).sum::<usize>()
        }
        _ => 1,
    }
}

/// State for one encode call: the output buffer, the growing offset table,
/// and the single file-global reference width
struct Encoder {
    buf: Vec<u8>,
    offsets: Vec<u64>,
    ref_width: usize,
}

impl Encoder {
    /// Write one object and return its assigned offset-table index
    fn write_object(&mut self, value: &Value) -> u64 {
        let index = self.offsets.len() as u64;
        self.offsets.push(self.buf.len() as u64);
        match value {
            Value::Null => self.buf.push(marker::pack(TypeTag::NullOrBool, NIBBLE_NULL)),
            Value::Bool(false) => self.buf.push(marker::pack(TypeTag::NullOrBool, NIBBLE_FALSE)),
            Value::Bool(true) => self.buf.push(marker::pack(TypeTag::NullOrBool, NIBBLE_TRUE)),
            Value::Int(v) => self.put_integer(*v),
            Value::Real(v) => self.put_real(*v),
            Value::Timestamp(secs) => {
                self.buf.push(marker::pack(TypeTag::Date, 3));
                self.buf.extend_from_slice(&secs.trunc().to_be_bytes());
            }
            Value::Bytes(bytes) => {
                self.put_count_header(TypeTag::Data, bytes.len());
                self.buf.extend_from_slice(bytes);
            }
            Value::Text(text) => self.put_string(text),
            Value::Array(items) => {
                self.put_count_header(TypeTag::Array, items.len());
                let patch_pos = self.reserve_refs(items.len());
                let refs: Vec<u64> = items.iter().map(|item| self.write_object(item)).collect();
                self.patch_refs(patch_pos, &refs);
            }
            Value::Dict(entries) => {
                self.put_count_header(TypeTag::Dict, entries.len());
                let patch_pos = self.reserve_refs(entries.len() * 2);
                let mut refs = Vec::with_capacity(entries.len() * 2);
                for (key, _) in entries {
                    refs.push(self.write_key(key));
                }
                for (_, value) in entries {
                    refs.push(self.write_object(value));
                }
                self.patch_refs(patch_pos, &refs);
            }
        }
        index
    }

    /// Dict keys are ordinary string objects with their own table index
    fn write_key(&mut self, key: &str) -> u64 {
        let index = self.offsets.len() as u64;
        self.offsets.push(self.buf.len() as u64);
        self.put_string(key);
        index
    }

    fn put_string(&mut self, text: &str) {
        if text.is_ascii() {
            self.put_count_header(TypeTag::AsciiString, text.len());
            self.buf.extend_from_slice(text.as_bytes());
        } else {
            // Count is the UTF-16 code-unit count, not the byte count.
            let units: Vec<u16> = text.encode_utf16().collect();
            self.put_count_header(TypeTag::Utf16String, units.len());
            for unit in units {
                self.buf.extend_from_slice(&unit.to_be_bytes());
            }
        }
    }

    fn put_integer(&mut self, value: i64) {
        let raw = value.to_be_bytes();
        // Trim to the minimal width, then round up to 1/2/4/8. Negatives keep
        // their leading 0xFF bytes and always land on the full 8.
        let width = pow2_width(regulate(&raw, 1).len());
        self.buf
            .push(marker::pack(TypeTag::Integer, width.trailing_zeros() as u8));
        self.buf.extend_from_slice(&raw[8 - width..]);
    }

    fn put_real(&mut self, value: f64) {
        let payload = regulate_real(value.to_be_bytes());
        self.buf
            .push(marker::pack(TypeTag::Real, payload.len().trailing_zeros() as u8));
        self.buf.extend_from_slice(&payload);
    }

    /// Inline count in the low nibble for 0..=14, otherwise the overflow
    /// sentinel followed by a nested integer object holding the true count
    fn put_count_header(&mut self, tag: TypeTag, count: usize) {
        if count <= MAX_INLINE_COUNT {
            self.buf.push(marker::pack(tag, count as u8));
        } else {
            self.buf.push(marker::pack(tag, COUNT_OVERFLOW));
            self.put_integer(count as i64);
        }
    }

    /// Reserve zeroed reference slots and return their patch position
    fn reserve_refs(&mut self, slots: usize) -> usize {
        let patch_pos = self.buf.len();
        self.buf.resize(patch_pos + slots * self.ref_width, 0);
        patch_pos
    }

    /// Back-fill reserved reference slots with assigned table indices
    fn patch_refs(&mut self, patch_pos: usize, refs: &[u64]) {
        for (slot, &index) in refs.iter().enumerate() {
            let start = patch_pos + slot * self.ref_width;
            self.buf[start..start + self.ref_width]
                .copy_from_slice(&index.to_be_bytes()[8 - self.ref_width..]);
        }
    }
}

fn put_be_uint(buf: &mut Vec<u8>, value: u64, width: usize) {
    buf.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Payload region of a single-scalar stream (everything after the magic
    /// up to the offset table is the one object)
    fn root_object(buf: &[u8]) -> &[u8] {
        &buf[MAGIC.len()..]
    }

    #[test]
    fn integer_width_ladder() {
        let cases: [(i64, &[u8]); 5] = [
            (0, &[0x10, 0x00]),
            (255, &[0x10, 0xFF]),
            (256, &[0x11, 0x01, 0x00]),
            (65536, &[0x12, 0x00, 0x01, 0x00, 0x00]),
            (1 << 32, &[0x13, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]),
        ];
        for (value, expected) in cases {
            let buf = encode(&Value::Int(value)).unwrap();
            assert_eq!(
                &root_object(&buf)[..expected.len()],
                expected,
                "wire bytes for {value}"
            );
        }
    }

    #[test]
    fn negative_integers_use_full_width() {
        let buf = encode(&Value::Int(-1)).unwrap();
        assert_eq!(&root_object(&buf)[..9], &[0x13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn reals_are_four_or_eight_bytes() {
        let buf = encode(&Value::Real(1.5)).unwrap();
        assert_eq!(root_object(&buf)[0], 0x23);
        let buf = encode(&Value::Real(0.0)).unwrap();
        assert_eq!(root_object(&buf)[0], 0x22);
        assert_eq!(&root_object(&buf)[1..5], &[0, 0, 0, 0]);
    }

    #[test]
    fn timestamp_marker_is_fixed_width() {
        let buf = encode(&Value::Timestamp(0.0)).unwrap();
        assert_eq!(&root_object(&buf)[..9], &[0x33, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn empty_containers_use_inline_zero_count() {
        assert_eq!(root_object(&encode(&Value::Array(vec![])).unwrap())[0], 0xA0);
        assert_eq!(root_object(&encode(&Value::Dict(vec![])).unwrap())[0], 0xD0);
    }

    #[test]
    fn inline_count_boundary_at_fourteen() {
        let buf = encode(&Value::Array(vec![Value::Null; 14])).unwrap();
        assert_eq!(root_object(&buf)[0], 0xAE);

        let buf = encode(&Value::Array(vec![Value::Null; 15])).unwrap();
        // Overflow sentinel, then a nested 1-byte integer object holding 15.
        assert_eq!(&root_object(&buf)[..3], &[0xAF, 0x10, 0x0F]);
    }

    #[test]
    fn reference_width_follows_total_object_count() {
        // 1 array + 13 children = 14 slots -> 1-byte references.
        let buf = encode(&Value::Array(vec![Value::Null; 13])).unwrap();
        assert_eq!(buf[buf.len() - 25], 1);

        // 1 array + 299 children = 300 slots -> 2-byte references.
        let buf = encode(&Value::Array(vec![Value::Null; 299])).unwrap();
        assert_eq!(buf[buf.len() - 25], 2);
    }

    #[test]
    fn pre_pass_counts_match_traversal() {
        let graph = Value::Dict(vec![
            ("a".into(), Value::Array(vec![Value::Int(1), Value::Null])),
            ("b".into(), Value::Dict(vec![("c".into(), Value::Bool(true))])),
        ]);
        // dict(1) + 2 keys + array(1) + 2 items + dict(1) + 1 key + 1 value
        assert_eq!(count_objects(&graph), 9);
        let buf = encode(&graph).unwrap();
        let count = u64::from_be_bytes(buf[buf.len() - 24..buf.len() - 16].try_into().unwrap());
        assert_eq!(count, 9);
    }

    #[test]
    fn encode_to_flushes_complete_stream() {
        let mut sink = Vec::new();
        encode_to(&Value::Int(7), &mut sink).unwrap();
        assert_eq!(sink, encode(&Value::Int(7)).unwrap());
    }
}
