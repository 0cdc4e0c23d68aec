//! End-to-end hide/reveal of text in a sample buffer.
//!
//! Encode direction: text → Huffman encode → frame → LSB embed.
//! Decode direction is the exact inverse.
//!
//! All functions validate everything that can fail before the first write
//! to the buffer, so a failed call leaves `pixels` untouched.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::config::StegoConfig;
use crate::error::{Result, StegoError};
use crate::framing::{self, FramingMode};
use crate::huffman;
use crate::lsb;
use crate::session::SessionStore;

/// Statistics about one successful embed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedReport {
    /// Characters in the hidden text.
    pub text_chars: usize,
    /// Size of the text at 8 bits per character.
    pub text_bits: usize,
    /// Size of the Huffman-encoded text.
    pub encoded_bits: usize,
    /// Bits written into the buffer, header included.
    pub payload_bits: usize,
    /// LSB slots available in the buffer.
    pub capacity_bits: usize,
    /// `(1 - encoded / text) * 100`, zero for empty text.
    pub compression_percent: f64,
}

impl EmbedReport {
    fn new(text: &str, encoded_bits: usize, payload_bits: usize, capacity_bits: usize) -> Self {
        let text_chars = text.chars().count();
        let text_bits = text_chars * 8;
        let compression_percent = if text_bits == 0 {
            0.0
        } else {
            (1.0 - encoded_bits as f64 / text_bits as f64) * 100.0
        };
        Self {
            text_chars,
            text_bits,
            encoded_bits,
            payload_bits,
            capacity_bits,
            compression_percent,
        }
    }
}

fn require_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(StegoError::Validation("no text to hide".to_string()));
    }
    Ok(())
}

/// Hide `text` in `pixels` with the self-describing framing.
///
/// # Errors
///
/// - `StegoError::Validation` for empty text.
/// - `StegoError::Capacity` if the framed payload does not fit.
pub fn hide_text(pixels: &mut [u8], text: &str) -> Result<EmbedReport> {
    require_text(text)?;
    let (bits, table) = huffman::encode(text)?;
    let payload = bytes_to_bits(&framing::pack(&table, &bits)?);
    lsb::embed(pixels, &payload)?;

    let report = EmbedReport::new(text, bits.len(), payload.len(), lsb::capacity(pixels));
    debug!(?report, "text hidden (self-describing)");
    Ok(report)
}

/// Recover text hidden with [`hide_text`].
///
/// # Errors
///
/// `StegoError::CorruptData` or `StegoError::Decode` if the buffer does not
/// hold a valid payload.
pub fn reveal_text(pixels: &[u8]) -> Result<String> {
    let body = lsb::extract_framed(pixels, FramingMode::SelfDescribing)?;
    let (table, bits) = framing::unpack_body(&bits_to_bytes(&body))?;
    let text = huffman::decode(&bits, &table)?;
    debug!(chars = text.chars().count(), "text revealed (self-describing)");
    Ok(text)
}

/// Hide `text` in `pixels` with the session-keyed framing.
///
/// The code table is registered in `store` under `session_id` only after the
/// embed succeeded.
pub fn hide_text_keyed(
    pixels: &mut [u8],
    text: &str,
    store: &SessionStore,
    session_id: &str,
) -> Result<EmbedReport> {
    require_text(text)?;
    if session_id.is_empty() {
        return Err(StegoError::Validation("session id cannot be empty".to_string()));
    }
    let (bits, table) = huffman::encode(text)?;
    let payload = framing::pack_keyed(&bits)?;
    lsb::embed(pixels, &payload)?;
    store.insert(session_id, table);

    let report = EmbedReport::new(text, bits.len(), payload.len(), lsb::capacity(pixels));
    debug!(session = %session_id, ?report, "text hidden (session-keyed)");
    Ok(report)
}

/// Recover text hidden with [`hide_text_keyed`].
///
/// # Errors
///
/// - `StegoError::MissingSession` if `session_id` is not in `store`.
/// - `StegoError::CorruptData` or `StegoError::Decode` for a bad payload.
pub fn reveal_text_keyed(pixels: &[u8], store: &SessionStore, session_id: &str) -> Result<String> {
    let table = store.get(session_id)?;
    let bits = lsb::extract_framed(pixels, FramingMode::SessionKeyed)?;
    let text = huffman::decode(&bits, &table)?;
    debug!(session = %session_id, chars = text.chars().count(), "text revealed (session-keyed)");
    Ok(text)
}

/// Hide/reveal front end bound to one configuration.
#[derive(Debug, Clone)]
pub struct StegoCodec {
    config: StegoConfig,
    sessions: Arc<SessionStore>,
}

impl Default for StegoCodec {
    fn default() -> Self {
        Self::new(StegoConfig::default())
    }
}

impl StegoCodec {
    /// Create a codec with its own session store sized from `config`.
    pub fn new(config: StegoConfig) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session.clone()));
        Self { config, sessions }
    }

    /// Create a codec that shares an existing session store.
    pub fn with_store(config: StegoConfig, sessions: Arc<SessionStore>) -> Self {
        Self { config, sessions }
    }

    pub fn config(&self) -> &StegoConfig {
        &self.config
    }

    pub fn mode(&self) -> FramingMode {
        self.config.mode
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Payload bits `pixels` can hold after this mode's header.
    pub fn capacity(&self, pixels: &[u8]) -> usize {
        lsb::max_payload_bits(pixels, self.config.mode)
    }

    /// Hide `text` using the configured framing.
    ///
    /// `session_id` is required for the session-keyed framing and ignored
    /// otherwise.
    pub fn hide(&self, pixels: &mut [u8], text: &str, session_id: Option<&str>) -> Result<EmbedReport> {
        match self.config.mode {
            FramingMode::SelfDescribing => hide_text(pixels, text),
            FramingMode::SessionKeyed => {
                let id = require_session(session_id)?;
                hide_text_keyed(pixels, text, &self.sessions, id)
            }
        }
    }

    /// Reveal text using the configured framing.
    pub fn reveal(&self, pixels: &[u8], session_id: Option<&str>) -> Result<String> {
        match self.config.mode {
            FramingMode::SelfDescribing => reveal_text(pixels),
            FramingMode::SessionKeyed => {
                let id = require_session(session_id)?;
                reveal_text_keyed(pixels, &self.sessions, id)
            }
        }
    }
}

fn require_session(session_id: Option<&str>) -> Result<&str> {
    session_id.ok_or_else(|| {
        StegoError::Validation("session-keyed framing needs a session id".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    /// Gradient RGB buffer so LSBs start out mixed.
    fn cover(pixel_count: usize) -> Vec<u8> {
        (0..pixel_count * 3).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn test_aaab_scenario_self_describing() {
        let mut pixels = cover(100);
        let report = hide_text(&mut pixels, "aaab").unwrap();
        assert_eq!(report.encoded_bits, 4);
        assert_eq!(report.text_bits, 32);
        assert_eq!(report.payload_bits, 32 + 23 * 8);
        assert_eq!(reveal_text(&pixels).unwrap(), "aaab");
    }

    #[test]
    fn test_aaab_scenario_session_keyed() {
        let store = SessionStore::default();
        let mut pixels = cover(10);
        let report = hide_text_keyed(&mut pixels, "aaab", &store, "img-1").unwrap();
        assert_eq!(report.payload_bits, 24 + 4);
        // Header 000..0100 followed by 0001.
        let lsbs: Vec<u8> = pixels[..28].iter().map(|p| p & 1).collect();
        assert_eq!(&lsbs[21..], &[1, 0, 0, 0, 0, 0, 1]);
        assert_eq!(reveal_text_keyed(&pixels, &store, "img-1").unwrap(), "aaab");
    }

    #[test]
    fn test_roundtrip_longer_text() {
        let text = "Meet me at the old mill at midnight. Bring the map!\nP.S. 🦀";
        let mut pixels = cover(2000);
        let report = hide_text(&mut pixels, text).unwrap();
        assert!(report.compression_percent < 100.0);
        assert_eq!(report.capacity_bits, 6000);
        assert_eq!(reveal_text(&pixels).unwrap(), text);
    }

    #[test]
    fn test_hide_rejects_empty_text() {
        let mut pixels = cover(100);
        let original = pixels.clone();
        let err = hide_text(&mut pixels, "").unwrap_err();
        assert!(matches!(err, StegoError::Validation(_)));
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_hide_too_small_leaves_buffer() {
        let mut pixels = cover(10);
        let original = pixels.clone();
        let err = hide_text(&mut pixels, "this will never fit in thirty samples").unwrap_err();
        assert!(matches!(err, StegoError::Capacity { .. }));
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_keyed_capacity_failure_registers_nothing() {
        let store = SessionStore::default();
        let mut pixels = cover(5);
        let err = hide_text_keyed(&mut pixels, "too long for fifteen", &store, "s").unwrap_err();
        assert!(matches!(err, StegoError::Capacity { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_reveal_unknown_session() {
        let store = SessionStore::default();
        let mut pixels = cover(50);
        hide_text_keyed(&mut pixels, "hello", &store, "right").unwrap();
        let err = reveal_text_keyed(&pixels, &store, "wrong").unwrap_err();
        assert_eq!(err, StegoError::MissingSession("wrong".to_string()));
    }

    #[test]
    fn test_keyed_empty_session_id() {
        let store = SessionStore::default();
        let mut pixels = cover(50);
        let err = hide_text_keyed(&mut pixels, "hi", &store, "").unwrap_err();
        assert!(matches!(err, StegoError::Validation(_)));
    }

    #[test]
    fn test_reveal_clean_image_is_corrupt() {
        // LSBs all set: header declares a huge payload.
        let pixels = vec![0xFFu8; 3000];
        let err = reveal_text(&pixels).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_reveal_zeroed_image() {
        // LSBs all clear: zero-length body cannot hold the table/bit counts.
        let pixels = vec![0u8; 300];
        let err = reveal_text(&pixels).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)));
    }

    #[test]
    fn test_reveal_tampered_payload() {
        let mut pixels = cover(400);
        hide_text(&mut pixels, "tamper evident?").unwrap();
        // Flip the LSB of a sample inside the entry count.
        pixels[32 + 5] ^= 1;
        let err = reveal_text(&pixels).unwrap_err();
        assert!(matches!(err, StegoError::CorruptData(_)), "got {err:?}");
    }

    #[test]
    fn test_codec_dispatches_on_mode() {
        let codec = StegoCodec::default();
        assert_eq!(codec.mode(), FramingMode::SelfDescribing);
        let mut pixels = cover(500);
        codec.hide(&mut pixels, "self describing", None).unwrap();
        assert_eq!(codec.reveal(&pixels, None).unwrap(), "self describing");

        let keyed = StegoCodec::new(StegoConfig::session_keyed());
        let mut pixels = cover(500);
        keyed.hide(&mut pixels, "keyed", Some("abc")).unwrap();
        assert_eq!(keyed.reveal(&pixels, Some("abc")).unwrap(), "keyed");
        assert_eq!(keyed.sessions().len(), 1);
        assert!(matches!(
            keyed.reveal(&pixels, None),
            Err(StegoError::Validation(_))
        ));
    }

    #[test]
    fn test_codecs_share_store() {
        let store = Arc::new(SessionStore::new(SessionConfig::default()));
        let writer = StegoCodec::with_store(StegoConfig::session_keyed(), Arc::clone(&store));
        let reader = StegoCodec::with_store(StegoConfig::session_keyed(), Arc::clone(&store));
        let mut pixels = cover(200);
        writer.hide(&mut pixels, "shared", Some("x")).unwrap();
        assert_eq!(reader.reveal(&pixels, Some("x")).unwrap(), "shared");
    }

    #[test]
    fn test_codec_capacity() {
        let codec = StegoCodec::default();
        assert_eq!(codec.capacity(&cover(100)), 300 - 32);
        let keyed = StegoCodec::new(StegoConfig::session_keyed());
        assert_eq!(keyed.capacity(&cover(100)), 300 - 24);
    }

    #[test]
    fn test_compression_percent_matches_formula() {
        let report = EmbedReport::new("aaab", 4, 100, 1000);
        assert!((report.compression_percent - 87.5).abs() < 1e-9);
        let empty = EmbedReport::new("", 0, 0, 0);
        assert_eq!(empty.compression_percent, 0.0);
    }
}
