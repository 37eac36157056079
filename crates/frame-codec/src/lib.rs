//! Frame Payload Decoding for Exam Proctoring
//!
//! Browser clients capture webcam frames with `canvas.toDataURL(...)` and
//! ship each one as a base64 string, usually prefixed with a `data:` URI
//! header. This crate turns those payloads into pixel buffers for the
//! detection pipeline:
//! - optional data-URI header stripping (everything up to the first comma)
//! - standard-alphabet base64 decoding
//! - JPEG/PNG decoding into RGB and grayscale views
//!
//! Decode failures are per-frame conditions, never fatal to a session.

pub mod frame;

pub use frame::{decode_payload, DecodedFrame};

use thiserror::Error;

/// Frame payload decode failures
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty frame payload")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unreadable image data: {0}")]
    Image(#[from] image::ImageError),
}
