//! Decoded frame type and payload decoding

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{GrayImage, RgbImage};

use crate::DecodeError;

/// Decoded webcam frame with color and grayscale views
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Full-color pixel data
    pub rgb: RgbImage,
    /// Grayscale view consumed by the detection pipeline
    pub gray: GrayImage,
}

impl DecodedFrame {
    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.gray.height()
    }
}

/// Decode a browser frame payload into pixel buffers.
///
/// Accepts raw base64 as well as `data:image/...;base64,` URIs. The URI
/// header is stripped up to and including the first comma without further
/// validation, matching what capture clients actually send.
pub fn decode_payload(payload: &str) -> Result<DecodedFrame, DecodeError> {
    let trimmed = payload.trim();
    let encoded = match trimmed.split_once(',') {
        Some((_, rest)) => rest,
        None => trimmed,
    };

    if encoded.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = STANDARD.decode(encoded)?;
    let img = image::load_from_memory(&bytes)?;

    Ok(DecodedFrame {
        rgb: img.to_rgb8(),
        gray: img.to_luma8(),
    })
}
