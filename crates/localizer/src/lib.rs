//! Subject Localization for Exam Proctoring
//!
//! Finds the candidate's face and eye regions in grayscale webcam frames.
//! Two backends implement the [`SubjectLocalizer`] capability:
//! - [`CascadeLocalizer`]: SeetaFace cascade via `rustface`; requires a
//!   model file at startup and is the deployment backend
//! - [`HeuristicLocalizer`]: model-free presence gate for development and
//!   tests
//!
//! The monitoring pipeline is single-subject: callers consume the first
//! face and the first eye region, so implementations order candidates
//! best-first. Multi-face arbitration is out of scope.

pub mod cascade;
pub mod eyes;
pub mod heuristic;
pub mod region;

pub use cascade::CascadeLocalizer;
pub use eyes::{propose_eye_regions, EyeBandConfig};
pub use heuristic::HeuristicLocalizer;
pub use region::Region;

use image::GrayImage;
use thiserror::Error;

/// Localizer construction failures
#[derive(Error, Debug)]
pub enum LocalizerError {
    #[error("cascade model unavailable: {0}")]
    ModelLoad(String),
}

/// Face and eye localization capability.
///
/// `detect_eyes` operates on a face crop, so returned regions are relative
/// to that crop, not to the full frame.
pub trait SubjectLocalizer: Send + Sync {
    /// Detect face regions in a grayscale frame, best candidate first.
    fn detect_faces(&self, frame: &GrayImage) -> Vec<Region>;

    /// Detect eye regions within a face crop, image-left eye first.
    ///
    /// An empty result for a detected face is the blink-candidate signal.
    fn detect_eyes(&self, face: &GrayImage) -> Vec<Region>;
}
