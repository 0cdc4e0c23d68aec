//! Bridge between image files and flat sample buffers.
//!
//! The codec itself only sees `[u8]` samples. This module uses the `image`
//! crate to turn PNG, BMP, or JPEG bytes into an RGB8 buffer and to write a
//! buffer back out as PNG.
//!
//! Output is always PNG: any lossy re-encode would disturb the LSBs and
//! destroy the payload.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use tracing::debug;

use crate::error::{Result, StegoError};
use crate::pipeline::{self, EmbedReport};

/// An RGB8 image as a flat, row-major sample buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB samples, 3 per pixel. Length is `width * height * 3`.
    pub pixels: Vec<u8>,
}

impl CoverImage {
    /// Create a CoverImage, checking the buffer matches the dimensions.
    ///
    /// # Errors
    ///
    /// Returns `StegoError::Validation` if `pixels.len() != width * height * 3`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        check_buffer(width, height, &pixels)?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a CoverImage from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Pixels in the image. Computed in `u64` so any pair of `u32`
    /// dimensions fits.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// LSB slots available, one per sample.
    pub fn capacity_bits(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Sample count for an RGB8 image, `None` if it does not fit in `usize`.
fn sample_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
}

fn check_buffer(width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    let expected = sample_len(width, height).ok_or_else(|| {
        StegoError::Validation(format!("dimensions {width}x{height} are too large"))
    })?;
    if pixels.len() != expected {
        return Err(StegoError::Validation(format!(
            "expected {expected} bytes (width * height * 3), got {}",
            pixels.len()
        )));
    }
    Ok(())
}

/// Decode PNG, BMP, or JPEG bytes into an RGB8 cover.
///
/// Alpha and extra precision are dropped by the RGB8 conversion.
///
/// # Errors
///
/// Returns `StegoError::Image` if the format is unknown or the data is corrupt.
pub fn decode_cover(bytes: &[u8]) -> Result<CoverImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StegoError::Image(e.to_string()))?;
    let img = reader
        .decode()
        .map_err(|e| StegoError::Image(e.to_string()))?;

    let cover = CoverImage::from_rgb_image(img.into_rgb8());
    debug!(
        width = cover.width,
        height = cover.height,
        pixels = cover.pixel_count(),
        "cover decoded"
    );
    Ok(cover)
}

/// Encode a cover as lossless PNG.
///
/// # Errors
///
/// - `StegoError::Validation` for zero dimensions or a mismatched buffer.
/// - `StegoError::Image` if PNG encoding fails.
pub fn encode_png(cover: &CoverImage) -> Result<Vec<u8>> {
    if cover.is_empty() {
        return Err(StegoError::Validation(format!(
            "invalid dimensions {}x{}",
            cover.width, cover.height
        )));
    }
    check_buffer(cover.width, cover.height, &cover.pixels)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(&cover.pixels, cover.width, cover.height, ExtendedColorType::Rgb8)
        .map_err(|e| StegoError::Image(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Hide `text` in an image file and return the stego image as PNG.
pub fn hide_text_in_image(bytes: &[u8], text: &str) -> Result<(Vec<u8>, EmbedReport)> {
    let mut cover = decode_cover(bytes)?;
    let report = pipeline::hide_text(&mut cover.pixels, text)?;
    Ok((encode_png(&cover)?, report))
}

/// Recover text from a stego image file.
pub fn reveal_text_from_image(bytes: &[u8]) -> Result<String> {
    let cover = decode_cover(bytes)?;
    pipeline::reveal_text(&cover.pixels)
}
