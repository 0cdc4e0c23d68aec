//! Huffstego WASM - WebAssembly bindings for huffstego
//!
//! This crate provides WASM bindings to expose the huffstego-core codec
//! to JavaScript/TypeScript applications. Uploads, downloads, and any HTTP
//! handling stay on the JavaScript side.
//!
//! # Module Structure
//!
//! - `huffman` - Raw Huffman compression (bits + code table)
//! - `stego` - Hide/reveal text in pixels or image files, configurable codec
//! - `session` - Session-keyed hide/reveal backed by a code-table store
//! - `types` - WASM-compatible wrapper types for image data and results
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_cover, hide_text_in_cover } from '@huffstego/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_cover(bytes);
//! const result = hide_text_in_cover(image, 'meet at dawn');
//! console.log(`Used ${result.payload_bits} of ${result.capacity_bits} bits`);
//! ```

use wasm_bindgen::prelude::*;

mod huffman;
mod session;
mod stego;
mod types;

// Re-export public types
pub use huffman::{huffman_decode, huffman_encode};
pub use session::JsSessionStore;
pub use stego::{
    decode_cover, encode_png, hide_text, hide_text_in_cover, hide_text_in_image, lsb_capacity,
    reveal_text, reveal_text_from_cover, reveal_text_from_image, JsStegoCodec,
};
pub use types::{JsCoverImage, JsHideResult};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
