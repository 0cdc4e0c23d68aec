//! Payload framing for compressed text.
//!
//! Two framings are supported. The deployment picks one through
//! [`FramingMode`]; the mode is never guessed from image content.
//!
//! # Self-describing
//!
//! Everything needed to decode travels in the image:
//!
//! ```text
//! [4 bytes ] N, u32 big-endian, byte length of the body
//! [N bytes ] body
//!
//! body:
//! [4 bytes ] entry count, u32 BE
//! entry*:
//!   [4 bytes] symbol, Unicode scalar value, u32 BE
//!   [2 bytes] code length in bits, u16 BE (>= 1)
//!   [K bytes] code bits, MSB first, zero-padded to a byte
//! [4 bytes ] encoded bit count, u32 BE
//! [M bytes ] encoded bits, MSB first, zero-padded to a byte
//! ```
//!
//! # Session-keyed
//!
//! Only the encoded bits travel in the image; the code table is kept in a
//! [`SessionStore`](crate::session::SessionStore):
//!
//! ```text
//! [24 bits] M, big-endian bit count
//! [M bits ] encoded bits
//! ```

use serde::{Deserialize, Serialize};

use crate::bits::{bits_to_bytes, bytes_to_bits, push_uint, read_uint};
use crate::error::{Result, StegoError};
use crate::huffman::{Code, CodeTable};

/// Header width of the self-describing framing, in bits.
pub const SELF_DESCRIBING_HEADER_BITS: usize = 32;

/// Header width of the session-keyed framing, in bits.
pub const SESSION_HEADER_BITS: usize = 24;

/// Largest bit count the 24-bit session header can declare.
pub const MAX_SESSION_BITS: usize = (1 << SESSION_HEADER_BITS) - 1;

/// Which framing policy a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    /// Code table and bits both embedded; decodable from the image alone.
    #[default]
    SelfDescribing,
    /// Only bits embedded; code table held in a session store.
    SessionKeyed,
}

/// What the length header of a framing counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Bits,
    Bytes,
}

impl LengthUnit {
    /// Number of payload bits a declared length stands for.
    ///
    /// Returns `None` on overflow.
    pub fn to_bits(self, declared: u64) -> Option<u64> {
        match self {
            LengthUnit::Bits => Some(declared),
            LengthUnit::Bytes => declared.checked_mul(8),
        }
    }
}

impl FramingMode {
    /// Width of the length header in bits.
    pub fn header_bits(self) -> usize {
        match self {
            FramingMode::SelfDescribing => SELF_DESCRIBING_HEADER_BITS,
            FramingMode::SessionKeyed => SESSION_HEADER_BITS,
        }
    }

    /// Unit the length header is expressed in.
    pub fn length_unit(self) -> LengthUnit {
        match self {
            FramingMode::SelfDescribing => LengthUnit::Bytes,
            FramingMode::SessionKeyed => LengthUnit::Bits,
        }
    }
}

/// Frame a code table and encoded bits as a self-describing payload.
///
/// The result starts with the 4-byte length header and is ready to be
/// embedded.
///
/// # Errors
///
/// Returns `StegoError::Validation` if the table is not prefix-free, a code
/// is longer than 65535 bits, or the bits or body exceed what a u32 can
/// describe.
pub fn pack(table: &CodeTable, bits: &[bool]) -> Result<Vec<u8>> {
    let body = pack_body(table, bits)?;
    let len = u32::try_from(body.len()).map_err(|_| {
        StegoError::Validation("payload too large for a 32-bit length header".to_string())
    })?;

    let mut payload = Vec::with_capacity(4 + body.len());
    payload.extend_from_slice(&len.to_be_bytes());
    payload.extend_from_slice(&body);
    Ok(payload)
}

/// Parse a self-describing payload produced by [`pack`].
///
/// Bytes after the declared body are ignored.
///
/// # Errors
///
/// Returns `StegoError::CorruptData` if the header or body is truncated or
/// malformed.
pub fn unpack(payload: &[u8]) -> Result<(CodeTable, Vec<bool>)> {
    let (header, rest) = payload.split_first_chunk::<4>().ok_or_else(|| {
        StegoError::CorruptData("payload shorter than its length header".to_string())
    })?;
    let len = u32::from_be_bytes(*header) as usize;
    if rest.len() < len {
        return Err(StegoError::CorruptData(format!(
            "length header declares {len} bytes but only {} follow",
            rest.len()
        )));
    }
    unpack_body(&rest[..len])
}

/// Serialize the body (table + bits) of a self-describing payload.
fn pack_body(table: &CodeTable, bits: &[bool]) -> Result<Vec<u8>> {
    table.validate()?;

    let mut body = Vec::new();
    body.extend_from_slice(&(table.len() as u32).to_be_bytes());
    for (symbol, code) in table.iter() {
        let code_len = u16::try_from(code.len()).map_err(|_| {
            StegoError::Validation(format!("code for {symbol:?} is too long to frame"))
        })?;
        body.extend_from_slice(&u32::from(symbol).to_be_bytes());
        body.extend_from_slice(&code_len.to_be_bytes());
        body.extend_from_slice(&bits_to_bytes(code.bits()));
    }

    let bit_count = u32::try_from(bits.len()).map_err(|_| {
        StegoError::Validation("encoded bits exceed a 32-bit count".to_string())
    })?;
    body.extend_from_slice(&bit_count.to_be_bytes());
    body.extend_from_slice(&bits_to_bytes(bits));
    Ok(body)
}

/// Parse the body of a self-describing payload, header already stripped.
///
/// # Errors
///
/// Returns `StegoError::CorruptData` on truncation, an invalid symbol, a
/// zero-length code, an ambiguous table, or unused trailing bytes.
pub fn unpack_body(body: &[u8]) -> Result<(CodeTable, Vec<bool>)> {
    let mut reader = BodyReader::new(body);

    let count = reader.read_u32()?;
    let mut pairs = Vec::new();
    for _ in 0..count {
        let scalar = reader.read_u32()?;
        let symbol = char::from_u32(scalar).ok_or_else(|| {
            StegoError::CorruptData(format!("{scalar:#x} is not a Unicode scalar value"))
        })?;
        let code_len = reader.read_u16()? as usize;
        if code_len == 0 {
            return Err(StegoError::CorruptData(format!(
                "zero-length code for {symbol:?}"
            )));
        }
        let code_bits = reader.read_bits(code_len)?;
        pairs.push((symbol, Code::new(code_bits)?));
    }
    let table = CodeTable::from_codes(pairs).map_err(|e| match e {
        StegoError::Validation(msg) => StegoError::CorruptData(msg),
        other => other,
    })?;

    let bit_count = reader.read_u32()? as usize;
    let bits = reader.read_bits(bit_count)?;

    if reader.remaining() != 0 {
        return Err(StegoError::CorruptData(format!(
            "{} unused bytes after encoded bits",
            reader.remaining()
        )));
    }
    Ok((table, bits))
}

/// Frame encoded bits behind a 24-bit bit-count header.
///
/// # Errors
///
/// Returns `StegoError::Validation` if there are more bits than the header
/// can count.
pub fn pack_keyed(bits: &[bool]) -> Result<Vec<bool>> {
    if bits.len() > MAX_SESSION_BITS {
        return Err(StegoError::Validation(format!(
            "{} encoded bits exceed the 24-bit header limit of {MAX_SESSION_BITS}",
            bits.len()
        )));
    }
    let mut payload = Vec::with_capacity(SESSION_HEADER_BITS + bits.len());
    push_uint(&mut payload, bits.len() as u64, SESSION_HEADER_BITS);
    payload.extend_from_slice(bits);
    Ok(payload)
}

/// Recover the encoded bits from a session-keyed payload.
///
/// # Errors
///
/// Returns `StegoError::CorruptData` if the payload is shorter than its
/// header says.
pub fn unpack_keyed(payload: &[bool]) -> Result<Vec<bool>> {
    if payload.len() < SESSION_HEADER_BITS {
        return Err(StegoError::CorruptData(
            "payload shorter than its length header".to_string(),
        ));
    }
    let (header, rest) = payload.split_at(SESSION_HEADER_BITS);
    let count = read_uint(header) as usize;
    if rest.len() < count {
        return Err(StegoError::CorruptData(format!(
            "length header declares {count} bits but only {} follow",
            rest.len()
        )));
    }
    Ok(rest[..count].to_vec())
}

/// Cursor over a payload body that reports truncation as corrupt data.
struct BodyReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(StegoError::CorruptData(format!(
                "payload body truncated at byte {} (wanted {n} more)",
                self.pos
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read `count` bits stored MSB-first in whole bytes.
    fn read_bits(&mut self, count: usize) -> Result<Vec<bool>> {
        let bytes = self.take(count.div_ceil(8))?;
        let mut bits = bytes_to_bits(bytes);
        bits.truncate(count);
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{format_bits, parse_bits};
    use crate::huffman::encode;

    #[test]
    fn test_pack_aaab_layout() {
        let (bits, table) = encode("aaab").unwrap();
        let payload = pack(&table, &bits).unwrap();

        // body: count(4) + 2 * (symbol 4 + len 2 + 1 byte code) + bit count(4) + 1 byte bits
        let body_len = 4 + 2 * 7 + 4 + 1;
        assert_eq!(&payload[..4], &(body_len as u32).to_be_bytes());
        assert_eq!(payload.len(), 4 + body_len);
        assert_eq!(&payload[4..8], &2u32.to_be_bytes());
        assert_eq!(&payload[8..12], &('a' as u32).to_be_bytes());
        // encoded bits "0001" padded -> 0001_0000
        assert_eq!(*payload.last().unwrap(), 0b0001_0000);
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let (bits, table) = encode("hello, hidden world").unwrap();
        let payload = pack(&table, &bits).unwrap();
        let (table2, bits2) = unpack(&payload).unwrap();
        assert_eq!(table2, table);
        assert_eq!(bits2, bits);
    }

    #[test]
    fn test_pack_empty_text() {
        let payload = pack(&CodeTable::new(), &[]).unwrap();
        assert_eq!(payload.len(), 4 + 8);
        let (table, bits) = unpack(&payload).unwrap();
        assert!(table.is_empty());
        assert!(bits.is_empty());
    }

    #[test]
    fn test_unpack_ignores_trailing_bytes() {
        let (bits, table) = encode("trailing").unwrap();
        let mut payload = pack(&table, &bits).unwrap();
        payload.extend_from_slice(&[0xAA; 7]);
        let (table2, bits2) = unpack(&payload).unwrap();
        assert_eq!(table2, table);
        assert_eq!(bits2, bits);
    }

    #[test]
    fn test_unpack_short_header() {
        let err = unpack(&[0, 0]).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_unpack_declared_length_too_long() {
        let (bits, table) = encode("abc").unwrap();
        let mut payload = pack(&table, &bits).unwrap();
        payload.truncate(payload.len() - 1);
        let err = unpack(&payload).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_unpack_body_rejects_invalid_scalar() {
        let mut body = Vec::new();
        body.extend_from_slice(&1u32.to_be_bytes());
        body.extend_from_slice(&0xD800u32.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.push(0);
        body.extend_from_slice(&0u32.to_be_bytes());
        let err = unpack_body(&body).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_unpack_body_rejects_zero_length_code() {
        let mut body = Vec::new();
        body.extend_from_slice(&1u32.to_be_bytes());
        body.extend_from_slice(&('x' as u32).to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes());
        body.extend_from_slice(&0u32.to_be_bytes());
        let err = unpack_body(&body).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_unpack_body_rejects_ambiguous_table() {
        let mut body = Vec::new();
        body.extend_from_slice(&2u32.to_be_bytes());
        for (symbol, len, byte) in [('a', 1u16, 0x00u8), ('b', 2, 0x00)] {
            body.extend_from_slice(&(symbol as u32).to_be_bytes());
            body.extend_from_slice(&len.to_be_bytes());
            body.push(byte);
        }
        body.extend_from_slice(&0u32.to_be_bytes());
        let err = unpack_body(&body).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_unpack_body_rejects_trailing_garbage() {
        let (bits, table) = encode("xy").unwrap();
        let payload = pack(&table, &bits).unwrap();
        let mut body = payload[4..].to_vec();
        body.push(0);
        let err = unpack_body(&body).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_unpack_body_huge_count_is_truncation() {
        let body = u32::MAX.to_be_bytes();
        let err = unpack_body(&body).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_pack_rejects_ambiguous_table() {
        let mut table = CodeTable::new();
        table.insert('a', "1".parse().unwrap());
        table.insert('b', "10".parse().unwrap());
        let err = pack(&table, &[true]).unwrap_err();
        assert!(matches!(err, StegoError::Validation(_)));
    }

    #[test]
    fn test_keyed_roundtrip() {
        let bits = parse_bits("0001").unwrap();
        let payload = pack_keyed(&bits).unwrap();
        assert_eq!(payload.len(), 28);
        assert_eq!(format_bits(&payload[..24]), format!("{:024b}", 4));
        assert_eq!(unpack_keyed(&payload).unwrap(), bits);
    }

    #[test]
    fn test_keyed_limit() {
        let bits = vec![false; MAX_SESSION_BITS + 1];
        assert!(matches!(
            pack_keyed(&bits),
            Err(StegoError::Validation(_))
        ));
    }

    #[test]
    fn test_unpack_keyed_short() {
        let mut payload = pack_keyed(&[true, true, false]).unwrap();
        payload.pop();
        assert!(matches!(
            unpack_keyed(&payload),
            Err(StegoError::CorruptData(_))
        ));
        assert!(matches!(
            unpack_keyed(&[true; 10]),
            Err(StegoError::CorruptData(_))
        ));
    }

    #[test]
    fn test_mode_header_widths() {
        assert_eq!(FramingMode::SelfDescribing.header_bits(), 32);
        assert_eq!(FramingMode::SelfDescribing.length_unit(), LengthUnit::Bytes);
        assert_eq!(FramingMode::SessionKeyed.header_bits(), 24);
        assert_eq!(FramingMode::SessionKeyed.length_unit(), LengthUnit::Bits);
        assert_eq!(FramingMode::default(), FramingMode::SelfDescribing);
    }

    #[test]
    fn test_length_unit_overflow() {
        assert_eq!(LengthUnit::Bytes.to_bits(3), Some(24));
        assert_eq!(LengthUnit::Bits.to_bits(3), Some(3));
        assert_eq!(LengthUnit::Bytes.to_bits(u64::MAX), None);
    }
}
