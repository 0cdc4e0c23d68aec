//! Huffstego Core - Huffman-compressed LSB steganography
//!
//! This crate hides text in the least-significant bits of image samples.
//! Text is compressed with a deterministic Huffman code, framed together
//! with what is needed to decompress it, and written one bit per sample.
//!
//! # Module Structure
//!
//! - `bits` - byte/bit conversion and fixed-width integers
//! - `huffman` - frequency counting, tree construction, encode/decode
//! - `framing` - self-describing and session-keyed payload layouts
//! - `lsb` - capacity checks, embedding, and extraction
//! - `session` - bounded code-table store for the session-keyed framing
//! - `pipeline` - end-to-end hide/reveal on a sample buffer
//! - `image_io` - PNG/BMP/JPEG in, PNG out, via the `image` crate
//! - `config` - deployment settings
//!
//! # Examples
//!
//! ```ignore
//! use huffstego_core::{hide_text, reveal_text};
//!
//! let mut pixels = vec![128u8; 100 * 100 * 3];
//! hide_text(&mut pixels, "meet at dawn").unwrap();
//! assert_eq!(reveal_text(&pixels).unwrap(), "meet at dawn");
//! ```

pub mod bits;
pub mod config;
pub mod error;
pub mod framing;
pub mod huffman;
pub mod image_io;
pub mod lsb;
pub mod pipeline;
pub mod session;

pub use config::StegoConfig;
pub use error::{Result, StegoError};
pub use framing::FramingMode;
pub use huffman::{Code, CodeTable};
pub use image_io::{decode_cover, encode_png, CoverImage};
pub use pipeline::{
    hide_text, hide_text_keyed, reveal_text, reveal_text_keyed, EmbedReport, StegoCodec,
};
pub use session::{SessionConfig, SessionStore};
