//! Least-significant-bit embedding into flat sample buffers.
//!
//! The buffer is any sequence of 8-bit channel samples (`R,G,B,R,G,B,...`,
//! RGBA, grayscale). Each sample carries exactly one payload bit in bit 0,
//! so the channel layout does not matter.

use tracing::{debug, warn};

use crate::bits::read_uint;
use crate::error::{Result, StegoError};
use crate::framing::{FramingMode, LengthUnit};

/// Number of payload bits `pixels` can hold.
#[inline]
pub fn capacity(pixels: &[u8]) -> usize {
    pixels.len()
}

/// Total bits needed to embed a payload of `payload_bits` under `mode`,
/// header included.
pub fn required_bits(mode: FramingMode, payload_bits: usize) -> usize {
    mode.header_bits().saturating_add(payload_bits)
}

/// Largest payload (in bits, header excluded) `pixels` can carry under `mode`.
pub fn max_payload_bits(pixels: &[u8], mode: FramingMode) -> usize {
    capacity(pixels).saturating_sub(mode.header_bits())
}

/// Write `bits` into the LSBs of the first `bits.len()` samples.
///
/// Only bit 0 of touched samples changes; samples past the payload are left
/// as they were.
///
/// # Errors
///
/// Returns `StegoError::Capacity` if `bits` does not fit. The buffer is not
/// modified in that case.
///
/// # Example
/// ```
/// use huffstego_core::lsb::embed;
///
/// let mut pixels = vec![0xFF, 0x00, 0x10];
/// embed(&mut pixels, &[false, true]).unwrap();
/// assert_eq!(pixels, vec![0xFE, 0x01, 0x10]);
/// ```
pub fn embed(pixels: &mut [u8], bits: &[bool]) -> Result<()> {
    let available = capacity(pixels);
    if bits.len() > available {
        return Err(StegoError::Capacity {
            required: bits.len(),
            available,
        });
    }

    for (sample, &bit) in pixels.iter_mut().zip(bits) {
        *sample = (*sample & !1) | bit as u8;
    }
    debug!(bits = bits.len(), capacity = available, "lsb embed");
    Ok(())
}

/// Read the length header and the payload it declares.
///
/// The first `header_bits` LSBs form a big-endian length `n`; the payload is
/// the following `n` bits or `n` bytes depending on `unit`. The returned
/// bits exclude the header.
///
/// # Errors
///
/// Returns `StegoError::CorruptData` if the buffer cannot hold the header,
/// or if header plus declared payload exceeds the buffer. The declared
/// length comes from the image and is not trusted.
pub fn extract(pixels: &[u8], header_bits: usize, unit: LengthUnit) -> Result<Vec<bool>> {
    let available = capacity(pixels);
    if header_bits > 64 {
        return Err(StegoError::Validation(format!(
            "header of {header_bits} bits does not fit a 64-bit length"
        )));
    }
    if available < header_bits {
        return Err(StegoError::CorruptData(format!(
            "buffer of {available} samples cannot hold a {header_bits}-bit header"
        )));
    }

    let header = read_lsbs(&pixels[..header_bits]);
    let declared = read_uint(&header);
    let payload_bits = unit
        .to_bits(declared)
        .and_then(|bits| usize::try_from(bits).ok())
        .filter(|&bits| bits <= available - header_bits)
        .ok_or_else(|| {
            warn!(declared, ?unit, capacity = available, "declared payload exceeds capacity");
            StegoError::CorruptData(format!(
                "declared payload length {declared} ({unit:?}) exceeds image capacity"
            ))
        })?;

    debug!(payload_bits, capacity = available, "lsb extract");
    Ok(read_lsbs(&pixels[header_bits..header_bits + payload_bits]))
}

/// Extract a payload framed for `mode`.
pub fn extract_framed(pixels: &[u8], mode: FramingMode) -> Result<Vec<bool>> {
    extract(pixels, mode.header_bits(), mode.length_unit())
}

#[inline]
fn read_lsbs(samples: &[u8]) -> Vec<bool> {
    samples.iter().map(|&s| s & 1 == 1).collect()
}
