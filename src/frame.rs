//! Decoded frames and size normalization

use image::{imageops, RgbaImage};

use crate::{Error, Result, Viewport};

/// One captured frame: a decoded RGBA buffer tagged with its capture index.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based capture index (capture order == playback order)
    pub index: usize,
    /// Pixel data
    pub image: RgbaImage,
}

impl Frame {
    pub fn new(index: usize, image: RgbaImage) -> Self {
        Self { index, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Decode a PNG snapshot into an RGBA buffer.
pub fn decode_png(index: usize, bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| Error::DecodeError {
            frame: index,
            reason: e.to_string(),
        })?;
    Ok(decoded.into_rgba8())
}

/// Bring a decoded buffer to the exact viewport size.
///
/// Oversized buffers are cropped from the origin. Nothing is ever scaled or
/// padded: a buffer smaller than the viewport in some dimension keeps that
/// smaller size.
pub fn normalize(image: RgbaImage, viewport: Viewport) -> RgbaImage {
    if image.dimensions() == (viewport.width, viewport.height) {
        return image;
    }
    // crop_imm clamps the rectangle to the source bounds
    imageops::crop_imm(&image, 0, 0, viewport.width, viewport.height).to_image()
}
