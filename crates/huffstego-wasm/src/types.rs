//! WASM-compatible wrapper types for cover images and embed results.
//!
//! This module provides JavaScript-friendly types that wrap the core huffstego
//! types, handling the conversion between Rust and JavaScript data representations.

use huffstego_core::{CoverImage, EmbedReport, StegoError};
use wasm_bindgen::prelude::*;

/// A cover (or stego) image wrapper for JavaScript.
///
/// Holds RGB8 samples in row-major order. Every sample carries one hidden
/// bit, so `capacity_bits` equals `byte_length`.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsCoverImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsCoverImage {
    /// Create a new JsCoverImage from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsCoverImage {
        JsCoverImage {
            width,
            height,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 3 for RGB)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Number of hidden bits the image can hold, header included.
    #[wasm_bindgen(getter)]
    pub fn capacity_bits(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsCoverImage {
    pub(crate) fn from_cover(cover: CoverImage) -> Self {
        Self {
            width: cover.width,
            height: cover.height,
            pixels: cover.pixels,
        }
    }

    /// Convert to a core CoverImage, validating the buffer length.
    pub(crate) fn to_cover(&self) -> Result<CoverImage, StegoError> {
        CoverImage::new(self.width, self.height, self.pixels.clone())
    }

    pub(crate) fn samples(&self) -> &[u8] {
        &self.pixels
    }
}

/// Result of hiding text: the stego image plus embed statistics.
#[wasm_bindgen]
pub struct JsHideResult {
    image: Option<JsCoverImage>,
    report: EmbedReport,
}

#[wasm_bindgen]
impl JsHideResult {
    /// Take the stego image out of the result.
    ///
    /// Returns `undefined` if it was already taken.
    pub fn take_image(&mut self) -> Option<JsCoverImage> {
        self.image.take()
    }

    /// Characters in the hidden text.
    #[wasm_bindgen(getter)]
    pub fn text_chars(&self) -> usize {
        self.report.text_chars
    }

    /// Size of the Huffman-encoded text in bits.
    #[wasm_bindgen(getter)]
    pub fn encoded_bits(&self) -> usize {
        self.report.encoded_bits
    }

    /// Bits written into the image, header included.
    #[wasm_bindgen(getter)]
    pub fn payload_bits(&self) -> usize {
        self.report.payload_bits
    }

    /// LSB slots the image has.
    #[wasm_bindgen(getter)]
    pub fn capacity_bits(&self) -> usize {
        self.report.capacity_bits
    }

    /// Percentage saved versus 8 bits per character.
    #[wasm_bindgen(getter)]
    pub fn compression(&self) -> f64 {
        // Two decimals, matching what the upload UI shows.
        (self.report.compression_percent * 100.0).round() / 100.0
    }
}

impl JsHideResult {
    pub(crate) fn new(image: JsCoverImage, report: EmbedReport) -> Self {
        Self {
            image: Some(image),
            report,
        }
    }
}

/// Convert a core error into a JavaScript `Error` carrying its message.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
