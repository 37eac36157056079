//! Anthropometric eye-region proposal
//!
//! Neither detection backend carries an eye cascade. Eye regions are
//! proposed geometrically inside the face crop and kept only when they
//! contain enough pupil-dark mass. Closed eyelids hide the pupil, so a
//! detected face with zero qualifying regions is the blink-candidate
//! signal the state machine expects.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::Region;

/// Geometry and gating knobs for eye-region proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyeBandConfig {
    /// Top of the eye band as a fraction of face height
    pub band_top: f32,
    /// Bottom of the eye band as a fraction of face height
    pub band_bottom: f32,
    /// Outer horizontal margin as a fraction of face width
    pub outer_margin: f32,
    /// Half-gap kept clear around the nose line, as a fraction of face width
    pub inner_margin: f32,
    /// Intensity at or below which a pixel counts as pupil-dark
    pub dark_threshold: u8,
    /// Minimum pupil-dark pixel count for a box to qualify as an eye
    pub min_dark_pixels: u32,
}

impl Default for EyeBandConfig {
    fn default() -> Self {
        Self {
            band_top: 0.20,
            band_bottom: 0.55,
            outer_margin: 0.12,
            inner_margin: 0.04,
            dark_threshold: 55,
            min_dark_pixels: 12,
        }
    }
}

/// Propose eye regions inside a face crop, image-left box first.
///
/// Coordinates are relative to the crop. Faces smaller than 8x8 px carry
/// no usable eye detail and yield nothing.
pub fn propose_eye_regions(face: &GrayImage, config: &EyeBandConfig) -> Vec<Region> {
    let (w, h) = face.dimensions();
    if w < 8 || h < 8 {
        return Vec::new();
    }

    let top = (h as f32 * config.band_top) as u32;
    let bottom = ((h as f32 * config.band_bottom) as u32).min(h);
    if bottom <= top {
        return Vec::new();
    }
    let band_h = bottom - top;

    let outer = (w as f32 * config.outer_margin) as u32;
    let inner = (w as f32 * config.inner_margin) as u32;
    let mid = w / 2;

    let left_w = mid.saturating_sub(inner).saturating_sub(outer);
    let right_x = mid + inner;
    let right_w = w.saturating_sub(outer).saturating_sub(right_x);

    let candidates = [
        Region::new(outer, top, left_w, band_h),
        Region::new(right_x, top, right_w, band_h),
    ];

    candidates
        .into_iter()
        .filter(|r| r.width > 0)
        .filter(|r| dark_pixel_count(face, r, config.dark_threshold) >= config.min_dark_pixels)
        .collect()
}

fn dark_pixel_count(img: &GrayImage, region: &Region, threshold: u8) -> u32 {
    let mut count = 0;
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            if img.get_pixel(x, y)[0] <= threshold {
                count += 1;
            }
        }
    }
    count
}
