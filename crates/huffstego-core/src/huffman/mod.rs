//! Huffman compression of text.
//!
//! This module provides:
//! - Frequency counting in first-occurrence order
//! - Deterministic tree construction (reproducible codes across runs)
//! - Code table derivation with a single-symbol fallback
//! - Text encoding to a bit sequence and decoding back
//!
//! # Determinism
//!
//! Ties between equal weights are broken by insertion order, so a given text
//! always yields the same code table and bit sequence. See [`build_tree`].
//!
//! # Examples
//!
//! ```ignore
//! use huffstego_core::huffman::{decode, encode};
//!
//! let (bits, table) = encode("aaab").unwrap();
//! assert_eq!(bits, vec![false, false, false, true]);
//! assert_eq!(decode(&bits, &table).unwrap(), "aaab");
//! ```

mod table;
mod tree;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, StegoError};

pub use table::{derive_codes, Code, CodeTable};
pub use tree::{build_tree, FrequencyTable, HuffmanNode};

/// Compress `text` into a bit sequence and the table needed to decode it.
///
/// Empty text yields empty bits and an empty table.
pub fn encode(text: &str) -> Result<(Vec<bool>, CodeTable)> {
    if text.is_empty() {
        return Ok((Vec::new(), CodeTable::new()));
    }

    let frequencies = FrequencyTable::from_text(text);
    let root = build_tree(&frequencies)?;
    let table = derive_codes(&root);

    let mut bits = Vec::with_capacity(table.encoded_len(&frequencies) as usize);
    for c in text.chars() {
        let code = table.get(c).ok_or_else(|| {
            StegoError::Validation(format!("symbol {c:?} missing from derived code table"))
        })?;
        bits.extend_from_slice(code.bits());
    }

    debug!(
        symbols = table.len(),
        chars = frequencies.total(),
        encoded_bits = bits.len(),
        "huffman encode"
    );
    Ok((bits, table))
}

/// Decode `bits` with `table`.
///
/// Empty bits decode to the empty string whatever the table holds.
///
/// # Errors
///
/// - `StegoError::Validation` if the table is empty (for non-empty bits) or
///   not prefix-free.
/// - `StegoError::CorruptData` if a run of bits longer than every code
///   matches nothing.
/// - `StegoError::Decode` if the bits end partway through a code.
pub fn decode(bits: &[bool], table: &CodeTable) -> Result<String> {
    if bits.is_empty() {
        return Ok(String::new());
    }
    if table.is_empty() {
        return Err(StegoError::Validation(
            "cannot decode with an empty code table".to_string(),
        ));
    }
    table.validate()?;

    let lookup: HashMap<&[bool], char> = table.iter().map(|(s, c)| (c.bits(), s)).collect();
    let max_len = table.max_code_len();

    let mut text = String::new();
    let mut start = 0;
    for end in 1..=bits.len() {
        let prefix = &bits[start..end];
        if let Some(&symbol) = lookup.get(prefix) {
            text.push(symbol);
            start = end;
        } else if prefix.len() >= max_len {
            return Err(StegoError::CorruptData(format!(
                "no code matches the bits at offset {start}"
            )));
        }
    }

    if start != bits.len() {
        return Err(StegoError::Decode(format!(
            "bitstream ends inside a code ({} dangling bits)",
            bits.len() - start
        )));
    }
    Ok(text)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: decode(encode(t)) == t for arbitrary text.
        #[test]
        fn prop_roundtrip(text in ".{0,200}") {
            let (bits, table) = encode(&text).unwrap();
            prop_assert_eq!(decode(&bits, &table).unwrap(), text);
        }

        /// Property: printable ASCII drawn from a small alphabet round-trips.
        #[test]
        fn prop_roundtrip_ascii(text in "[ -~]{1,300}") {
            let (bits, table) = encode(&text).unwrap();
            prop_assert_eq!(decode(&bits, &table).unwrap(), text);
        }

        /// Property: every generated table is prefix-free.
        #[test]
        fn prop_prefix_free(text in ".{1,200}") {
            let (_, table) = encode(&text).unwrap();
            let codes: Vec<&Code> = table.iter().map(|(_, c)| c).collect();
            for (i, a) in codes.iter().enumerate() {
                for (j, b) in codes.iter().enumerate() {
                    if i != j {
                        prop_assert!(!a.is_prefix_of(b), "{} prefixes {}", a, b);
                    }
                }
            }
        }

        /// Property: code lengths satisfy the Kraft inequality.
        #[test]
        fn prop_kraft_inequality(text in "[a-h]{1,200}") {
            let (_, table) = encode(&text).unwrap();
            let max = table.max_code_len() as u32;
            // Scale by 2^max to stay in integers.
            let sum: u128 = table.iter().map(|(_, c)| 1u128 << (max - c.len() as u32)).sum();
            prop_assert!(sum <= 1u128 << max);
        }

        /// Property: encoded length equals the table's prediction.
        #[test]
        fn prop_encoded_len(text in ".{0,200}") {
            let (bits, table) = encode(&text).unwrap();
            let freq = FrequencyTable::from_text(&text);
            prop_assert_eq!(bits.len() as u64, table.encoded_len(&freq));
        }
    }
}
