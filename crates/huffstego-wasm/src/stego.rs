//! Hide/reveal WASM bindings.
//!
//! # Functions
//!
//! - [`lsb_capacity`] - LSB slots in a sample buffer
//! - [`hide_text`] / [`reveal_text`] - self-describing framing on a raw sample buffer
//! - [`hide_text_in_cover`] / [`reveal_text_from_cover`] - same, on a [`JsCoverImage`], with stats
//! - [`hide_text_in_image`] / [`reveal_text_from_image`] - same, on image file bytes
//! - [`decode_cover`] / [`encode_png`] - image file <-> pixel conversion
//! - [`JsStegoCodec`] - configurable codec, including the session-keyed framing
//!
//! # Example
//!
//! ```typescript
//! import { hide_text_in_image, reveal_text_from_image } from '@huffstego/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const png = hide_text_in_image(bytes, 'meet at dawn');
//! const text = reveal_text_from_image(png);
//! ```

use huffstego_core::{
    image_io, lsb, pipeline, SessionConfig, StegoCodec, StegoConfig, StegoError,
};
use wasm_bindgen::prelude::*;

use crate::types::{js_error, JsCoverImage, JsHideResult};

fn hide_samples(pixels: &[u8], text: &str) -> Result<Vec<u8>, StegoError> {
    let mut stego = pixels.to_vec();
    pipeline::hide_text(&mut stego, text)?;
    Ok(stego)
}

fn hide_into(image: &JsCoverImage, text: &str) -> Result<JsHideResult, StegoError> {
    let mut cover = image.to_cover()?;
    let report = pipeline::hide_text(&mut cover.pixels, text)?;
    Ok(JsHideResult::new(JsCoverImage::from_cover(cover), report))
}

/// Number of hidden bits a sample buffer can hold, header included.
#[wasm_bindgen]
pub fn lsb_capacity(pixels: &[u8]) -> usize {
    lsb::capacity(pixels)
}

/// Hide text in a raw sample buffer using the self-describing framing.
///
/// # Returns
///
/// A new `Uint8Array` holding the stego samples. The input is not modified.
///
/// # Errors
///
/// Returns an error if the text is empty or the buffer is too small for the
/// payload.
#[wasm_bindgen]
pub fn hide_text(pixels: &[u8], text: &str) -> Result<Vec<u8>, JsValue> {
    hide_samples(pixels, text).map_err(js_error)
}

/// Recover text hidden with [`hide_text`].
#[wasm_bindgen]
pub fn reveal_text(pixels: &[u8]) -> Result<String, JsValue> {
    pipeline::reveal_text(pixels).map_err(js_error)
}

/// Hide text in a cover image using the self-describing framing.
///
/// The input image is left unchanged; the stego pixels come back in the result
/// together with the embed statistics.
///
/// # Errors
///
/// Returns an error if the text is empty, the pixel buffer does not match the
/// dimensions, or the image is too small for the payload.
#[wasm_bindgen]
pub fn hide_text_in_cover(image: &JsCoverImage, text: &str) -> Result<JsHideResult, JsValue> {
    hide_into(image, text).map_err(js_error)
}

/// Recover text hidden with [`hide_text_in_cover`].
#[wasm_bindgen]
pub fn reveal_text_from_cover(image: &JsCoverImage) -> Result<String, JsValue> {
    pipeline::reveal_text(image.samples()).map_err(js_error)
}

/// Hide text in PNG/BMP/JPEG bytes and return a PNG.
#[wasm_bindgen]
pub fn hide_text_in_image(bytes: &[u8], text: &str) -> Result<Vec<u8>, JsValue> {
    image_io::hide_text_in_image(bytes, text)
        .map(|(png, _)| png)
        .map_err(js_error)
}

/// Recover text from stego image bytes.
#[wasm_bindgen]
pub fn reveal_text_from_image(bytes: &[u8]) -> Result<String, JsValue> {
    image_io::reveal_text_from_image(bytes).map_err(js_error)
}

/// Decode PNG/BMP/JPEG bytes into RGB pixels.
#[wasm_bindgen]
pub fn decode_cover(bytes: &[u8]) -> Result<JsCoverImage, JsValue> {
    image_io::decode_cover(bytes)
        .map(JsCoverImage::from_cover)
        .map_err(js_error)
}

/// Encode pixels as lossless PNG.
#[wasm_bindgen]
pub fn encode_png(image: &JsCoverImage) -> Result<Vec<u8>, JsValue> {
    let cover = image.to_cover().map_err(js_error)?;
    image_io::encode_png(&cover).map_err(js_error)
}

pub(crate) fn check_session_config(config: &SessionConfig) -> Result<(), StegoError> {
    // Session expiry reads `Instant`, which wasm32-unknown-unknown lacks.
    if cfg!(target_arch = "wasm32") && config.ttl_secs.is_some() {
        return Err(StegoError::Validation(
            "session TTL is not available in the browser build".to_string(),
        ));
    }
    Ok(())
}

fn parse_config(config: StegoConfig) -> Result<StegoConfig, StegoError> {
    check_session_config(&config.session)?;
    Ok(config)
}

/// A codec bound to one configuration, owning its session store.
///
/// # Example (TypeScript)
/// ```typescript
/// const codec = new JsStegoCodec({ mode: 'session_keyed', session: { max_entries: 64 } });
/// const result = codec.hide(image, 'secret', 'upload-42');
/// const stego = result.take_image();
/// const text = codec.reveal(stego, 'upload-42');
/// ```
#[wasm_bindgen]
pub struct JsStegoCodec {
    inner: StegoCodec,
}

#[wasm_bindgen]
impl JsStegoCodec {
    /// Create a codec from a config object. `undefined` uses the defaults
    /// (self-describing framing).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsStegoCodec, JsValue> {
        let config: StegoConfig = if config.is_undefined() || config.is_null() {
            StegoConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| js_error(format!("Invalid config: {}", e)))?
        };
        let config = parse_config(config).map_err(js_error)?;
        Ok(JsStegoCodec {
            inner: StegoCodec::new(config),
        })
    }

    /// Payload bits the image can hold after the framing header.
    pub fn capacity(&self, image: &JsCoverImage) -> usize {
        self.inner.capacity(image.samples())
    }

    /// Hide text; `session_id` is required in session-keyed mode.
    pub fn hide(
        &self,
        image: &JsCoverImage,
        text: &str,
        session_id: Option<String>,
    ) -> Result<JsHideResult, JsValue> {
        let mut cover = image.to_cover().map_err(js_error)?;
        let report = self
            .inner
            .hide(&mut cover.pixels, text, session_id.as_deref())
            .map_err(js_error)?;
        Ok(JsHideResult::new(JsCoverImage::from_cover(cover), report))
    }

    /// Reveal text; `session_id` is required in session-keyed mode.
    pub fn reveal(&self, image: &JsCoverImage, session_id: Option<String>) -> Result<String, JsValue> {
        self.inner
            .reveal(image.samples(), session_id.as_deref())
            .map_err(js_error)
    }

    /// Forget the code table registered for `session_id`.
    pub fn forget_session(&self, session_id: &str) -> bool {
        self.inner.sessions().remove(session_id).is_some()
    }

    /// Number of code tables currently held.
    #[wasm_bindgen(getter)]
    pub fn session_count(&self) -> usize {
        self.inner.sessions().len()
    }
}
