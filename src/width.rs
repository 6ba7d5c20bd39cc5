//! # Byte-Width Regulator
//!
//! ## Purpose
//!
//! Trims or pads big-endian byte sequences to the minimal width needed to hold
//! a value, shared by the integer, float, reference-width, and offset-table
//! paths. Integers regulate to a 1-byte minimum and the caller rounds the
//! result up to a power of two (1, 2, 4, or 8). Floats regulate to a 4-byte
//! minimum and are then right-padded with zero bytes until the total length is
//! itself a power of two, so a float payload is always exactly 4 or 8 bytes,
//! never 5-7. That padding rule looks redundant but is required for binary
//! compatibility with existing files.

/// Trim leading zero bytes of a big-endian sequence down to (not below) `min`,
/// or left-pad with zero bytes up to `min`.
pub fn regulate(bytes: &[u8], min: usize) -> Vec<u8> {
    if bytes.len() < min {
        let mut out = vec![0u8; min - bytes.len()];
        out.extend_from_slice(bytes);
        return out;
    }
    let lead = bytes
        .iter()
        .take(bytes.len() - min)
        .take_while(|&&b| b == 0)
        .count();
    bytes[lead..].to_vec()
}

/// Regulate an f64 bit pattern to its wire payload: trim to a 4-byte minimum,
/// then pad with trailing zero bytes until the length is a power of two.
pub fn regulate_real(bits: [u8; 8]) -> Vec<u8> {
    let mut out = regulate(&bits, 4);
    while !out.len().is_power_of_two() {
        out.push(0);
    }
    out
}

/// Round a regulated integer length up to the nearest storable width
pub fn pow2_width(len: usize) -> usize {
    match len {
        0 | 1 => 1,
        2 => 2,
        3 | 4 => 4,
        _ => 8,
    }
}

/// Minimal byte width (1..=8) able to hold `value`
///
/// Used for the global object-reference width (sized by the total object
/// count) and the offset-table entry width (sized by the largest offset).
/// Unlike integer payloads these widths are not rounded to a power of two.
pub fn min_byte_width(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}
