//! Pixel-space regions of interest

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle inside a frame or crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a region without bounds checking
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp signed detector output into a `bounds_w` x `bounds_h` frame.
    ///
    /// Cascade detectors may report boxes partially outside the frame near
    /// borders. Returns `None` when nothing of the rectangle survives.
    pub fn clamped(
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        bounds_w: u32,
        bounds_h: u32,
    ) -> Option<Self> {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        if x0 >= bounds_w || y0 >= bounds_h {
            return None;
        }

        // the part clipped off on the left/top shrinks the rectangle
        let visible_w = width.saturating_sub(x.min(0).unsigned_abs());
        let visible_h = height.saturating_sub(y.min(0).unsigned_abs());
        let w = visible_w.min(bounds_w - x0);
        let h = visible_h.min(bounds_h - y0);
        if w == 0 || h == 0 {
            return None;
        }

        Some(Self {
            x: x0,
            y: y0,
            width: w,
            height: h,
        })
    }

    /// Pixel area
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Extract this region from a grayscale image
    pub fn crop_from(&self, img: &GrayImage) -> GrayImage {
        image::imageops::crop_imm(img, self.x, self.y, self.width, self.height).to_image()
    }
}
