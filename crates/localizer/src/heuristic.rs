//! Model-free presence gating

use image::GrayImage;

use crate::eyes::{propose_eye_regions, EyeBandConfig};
use crate::{Region, SubjectLocalizer};

/// Presence-gate localizer for development and tests.
///
/// Treats the whole frame as a single face region whenever the luma spread
/// clears a floor. A covered lens or a blank feed produces a near-uniform
/// image and therefore no face, which drives the away escalation exactly
/// like an absent candidate. This is a presence gate, not a face detector;
/// deployments use [`crate::CascadeLocalizer`].
pub struct HeuristicLocalizer {
    min_std_dev: f64,
    eye_band: EyeBandConfig,
}

impl HeuristicLocalizer {
    /// Gate on the given luma standard-deviation floor
    pub fn new(min_std_dev: f64) -> Self {
        Self {
            min_std_dev,
            eye_band: EyeBandConfig::default(),
        }
    }
}

impl Default for HeuristicLocalizer {
    fn default() -> Self {
        Self::new(12.0)
    }
}

impl SubjectLocalizer for HeuristicLocalizer {
    fn detect_faces(&self, frame: &GrayImage) -> Vec<Region> {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return Vec::new();
        }
        if luma_std_dev(frame) < self.min_std_dev {
            return Vec::new();
        }
        vec![Region::new(0, 0, w, h)]
    }

    fn detect_eyes(&self, face: &GrayImage) -> Vec<Region> {
        propose_eye_regions(face, &self.eye_band)
    }
}

fn luma_std_dev(img: &GrayImage) -> f64 {
    let n = img.as_raw().len() as f64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for &p in img.as_raw() {
        let v = p as f64;
        sum += v;
        sum_sq += v * v;
    }
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0).sqrt()
}
