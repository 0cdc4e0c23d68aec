//! Conversion between bytes and bit sequences.
//!
//! Bits are represented as `bool` values in transmission order. Within a byte
//! the most significant bit comes first, and byte order is preserved.
//!
//! Converting bits back to bytes pads the final byte with zero bits. That
//! padding is not recoverable, so every framing that needs an exact bit
//! length stores it separately.

use crate::error::{Result, StegoError};

/// Expand bytes into bits, MSB first.
///
/// # Example
/// ```
/// use huffstego_core::bits::bytes_to_bits;
///
/// let bits = bytes_to_bits(&[0b1010_0000]);
/// assert_eq!(&bits[..4], &[true, false, true, false]);
/// ```
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits
}

/// Pack bits into bytes, MSB first, zero-padding the last byte.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << (7 - i)))
        })
        .collect()
}

/// Parse a textual bit string made only of `'0'` and `'1'`.
///
/// # Errors
///
/// Returns `StegoError::Validation` on the first character that is not a
/// binary digit.
pub fn parse_bits(text: &str) -> Result<Vec<bool>> {
    text.chars()
        .enumerate()
        .map(|(i, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(StegoError::Validation(format!(
                "non-binary character {other:?} at position {i}"
            ))),
        })
        .collect()
}

/// Render bits as a `'0'`/`'1'` string.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Append `value` as a big-endian integer of exactly `width` bits.
///
/// Bits of `value` above `width` are discarded; callers check the range.
pub fn push_uint(out: &mut Vec<bool>, value: u64, width: usize) {
    debug_assert!(width <= 64);
    for shift in (0..width).rev() {
        out.push((value >> shift) & 1 == 1);
    }
}

/// Read bits as a big-endian unsigned integer. At most 64 bits are meaningful.
pub fn read_uint(bits: &[bool]) -> u64 {
    debug_assert!(bits.len() <= 64);
    bits.iter().fold(0u64, |acc, &bit| (acc << 1) | bit as u64)
}
