//! Pupil isolation via thresholding, morphology and contour moments

use std::cmp::Ordering;

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;
use imageproc::point::Point;
use serde::Serialize;

use crate::direction::{classify, GazeDirection};

/// Intensity at or below which a pixel is considered pupil-dark
pub const PUPIL_INTENSITY_THRESHOLD: u8 = 55;

/// Contours at or below this shoelace area are treated as noise
pub const MIN_PUPIL_AREA: f64 = 10.0;

/// A pupil fix inside an eye crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GazeEstimate {
    pub direction: GazeDirection,
    /// Pupil centroid normalized to the crop width, 0.0 = far left
    pub relative_x: f64,
}

impl GazeEstimate {
    /// The degeneracy fallback: centered pupil at mid-crop.
    ///
    /// An unreadable eye must never count against the candidate, so every
    /// failure mode of [`estimate`] lands here.
    pub fn neutral() -> Self {
        Self {
            direction: GazeDirection::Center,
            relative_x: 0.5,
        }
    }
}

/// Estimate the gaze direction from a grayscale eye crop.
pub fn estimate(eye: &GrayImage) -> GazeEstimate {
    let (width, height) = eye.dimensions();
    if width == 0 || height == 0 {
        return GazeEstimate::neutral();
    }

    let binary = threshold(eye, PUPIL_INTENSITY_THRESHOLD, ThresholdType::BinaryInverted);
    let opened = open(&binary, Norm::LInf, 1);

    let contours = find_contours::<i32>(&opened);
    let best = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| (c, signed_area(&c.points)))
        .max_by(|(_, a), (_, b)| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal));

    let (contour, signed) = match best {
        Some(found) => found,
        None => return GazeEstimate::neutral(),
    };
    if signed.abs() <= MIN_PUPIL_AREA {
        return GazeEstimate::neutral();
    }

    let cx = match centroid_x(&contour.points, signed) {
        Some(cx) => cx,
        None => return GazeEstimate::neutral(),
    };

    let relative_x = cx / f64::from(width);
    GazeEstimate {
        direction: classify(relative_x),
        relative_x,
    }
}

/// Signed shoelace area of a boundary polygon
fn signed_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        sum += f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y);
    }
    sum / 2.0
}

/// Horizontal polygon centroid from first moments.
///
/// `None` when the signed area vanishes (collinear or duplicate points).
fn centroid_x(points: &[Point<i32>], signed_area: f64) -> Option<f64> {
    if signed_area.abs() < f64::EPSILON {
        return None;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        let cross = f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y);
        sum += (f64::from(p.x) + f64::from(q.x)) * cross;
    }
    Some(sum / (6.0 * signed_area))
}
