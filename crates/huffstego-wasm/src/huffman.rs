//! Huffman codec WASM bindings.
//!
//! Exposes the raw compression step so the UI can show bit counts and the
//! code table before anything is embedded.
//!
//! # Example
//!
//! ```typescript
//! import { huffman_encode, huffman_decode } from '@huffstego/wasm';
//!
//! const { bits, codes } = huffman_encode('aaab');
//! // bits === '0001', codes === { a: '0', b: '1' }
//! const text = huffman_decode(bits, codes);
//! ```

use huffstego_core::bits::{format_bits, parse_bits};
use huffstego_core::{huffman, CodeTable, StegoError};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::types::js_error;

/// Compressed text as handed to JavaScript.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct EncodedText {
    bits: String,
    codes: CodeTable,
}

fn encode_text(text: &str) -> Result<EncodedText, StegoError> {
    let (bits, codes) = huffman::encode(text)?;
    Ok(EncodedText {
        bits: format_bits(&bits),
        codes,
    })
}

fn decode_text(bits: &str, codes: &CodeTable) -> Result<String, StegoError> {
    huffman::decode(&parse_bits(bits)?, codes)
}

/// Compress text.
///
/// # Returns
///
/// An object `{ bits: string, codes: { [symbol]: string } }` where `bits`
/// is a `'0'`/`'1'` string.
#[wasm_bindgen]
pub fn huffman_encode(text: &str) -> Result<JsValue, JsValue> {
    let encoded = encode_text(text).map_err(js_error)?;
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    encoded.serialize(&serializer).map_err(js_error)
}

/// Decompress a `'0'`/`'1'` string with a code table object.
///
/// # Errors
///
/// Returns an error if the table is malformed or not prefix-free, or if the
/// bits are not a valid encoding under it.
#[wasm_bindgen]
pub fn huffman_decode(bits: &str, codes: JsValue) -> Result<String, JsValue> {
    let codes: CodeTable = serde_wasm_bindgen::from_value(codes)
        .map_err(|e| js_error(format!("Invalid code table: {}", e)))?;
    decode_text(bits, &codes).map_err(js_error)
}

/// Tests for huffman bindings.
///
/// Functions returning `Result<T, JsValue>` only work on wasm32 targets, so
/// these exercise the helpers behind them.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text_aaab() {
        let encoded = encode_text("aaab").unwrap();
        assert_eq!(encoded.bits, "0001");
        assert_eq!(encoded.codes.get('a').unwrap().to_string(), "0");
        assert_eq!(decode_text(&encoded.bits, &encoded.codes).unwrap(), "aaab");
    }

    #[test]
    fn test_decode_text_rejects_non_binary() {
        let encoded = encode_text("abc").unwrap();
        let err = decode_text("01x", &encoded.codes).unwrap_err();
        assert!(matches!(err, StegoError::Validation(_)));
    }

    #[test]
    fn test_empty_text() {
        let encoded = encode_text("").unwrap();
        assert_eq!(encoded.bits, "");
        assert!(encoded.codes.is_empty());
        assert_eq!(decode_text("", &encoded.codes).unwrap(), "");
    }
}
