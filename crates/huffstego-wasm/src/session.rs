//! Session-keyed hide/reveal WASM bindings.
//!
//! The code table never enters the image; it stays in a [`JsSessionStore`]
//! under the caller's session id, so revealing needs the same store instance.
//!
//! # Example
//!
//! ```typescript
//! import { JsSessionStore } from '@huffstego/wasm';
//!
//! const store = new JsSessionStore({ max_entries: 64 });
//! const stego = store.hide_text_keyed(pixels, 'secret', 'upload-42');
//! const text = store.reveal_text_keyed(stego, 'upload-42');
//! ```

use std::sync::Arc;

use huffstego_core::{pipeline, SessionConfig, SessionStore, StegoError};
use wasm_bindgen::prelude::*;

use crate::stego::check_session_config;
use crate::types::js_error;

fn hide_keyed_samples(
    store: &SessionStore,
    pixels: &[u8],
    text: &str,
    session_id: &str,
) -> Result<Vec<u8>, StegoError> {
    let mut stego = pixels.to_vec();
    pipeline::hide_text_keyed(&mut stego, text, store, session_id)?;
    Ok(stego)
}

/// Bounded store of code tables for the session-keyed framing.
#[wasm_bindgen]
pub struct JsSessionStore {
    inner: Arc<SessionStore>,
}

#[wasm_bindgen]
impl JsSessionStore {
    /// Create a store from a session config object. `undefined` uses the
    /// defaults (1024 entries, no expiry).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsSessionStore, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| js_error(format!("Invalid session config: {}", e)))?
        };
        check_session_config(&config).map_err(js_error)?;
        Ok(JsSessionStore {
            inner: Arc::new(SessionStore::new(config)),
        })
    }

    /// Hide text behind a 24-bit header and keep its code table under
    /// `session_id`.
    ///
    /// # Returns
    ///
    /// A new `Uint8Array` with the stego samples. The input is not modified,
    /// and nothing is stored if the embed fails.
    pub fn hide_text_keyed(
        &self,
        pixels: &[u8],
        text: &str,
        session_id: &str,
    ) -> Result<Vec<u8>, JsValue> {
        hide_keyed_samples(&self.inner, pixels, text, session_id).map_err(js_error)
    }

    /// Recover text hidden with [`JsSessionStore::hide_text_keyed`].
    ///
    /// # Errors
    ///
    /// Fails if `session_id` is unknown or expired, or the samples do not
    /// hold a valid payload.
    pub fn reveal_text_keyed(&self, pixels: &[u8], session_id: &str) -> Result<String, JsValue> {
        pipeline::reveal_text_keyed(pixels, &self.inner, session_id).map_err(js_error)
    }

    /// Forget the code table registered for `session_id`.
    pub fn remove(&self, session_id: &str) -> bool {
        self.inner.remove(session_id).is_some()
    }

    /// Number of code tables currently held.
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.len()
    }
}


/// WASM-specific tests that require JsValue.
///
/// Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_hide_reveal_keyed() {
        let store = JsSessionStore::new(JsValue::UNDEFINED).unwrap();
        let pixels = vec![128u8; 20 * 20 * 3];
        let stego = store.hide_text_keyed(&pixels, "keyed", "id").unwrap();
        assert_eq!(store.reveal_text_keyed(&stego, "id").unwrap(), "keyed");
        assert!(store.reveal_text_keyed(&stego, "other").is_err());
    }

    #[wasm_bindgen_test]
    fn test_rejects_ttl() {
        let config = js_sys::JSON::parse(r#"{"ttl_secs":60}"#).unwrap();
        assert!(JsSessionStore::new(config).is_err());
    }
}
