//! SeetaFace cascade detection backend

use std::cmp::Ordering;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::GrayImage;
use tracing::{debug, info};

use crate::eyes::{propose_eye_regions, EyeBandConfig};
use crate::{LocalizerError, Region, SubjectLocalizer};

/// Face localizer backed by the `rustface` SeetaFace cascade.
///
/// The model is loaded once at construction; a missing or unreadable model
/// file is a fatal error, so a misconfigured service refuses to start
/// instead of silently degrading. Detector instances are rebuilt per call
/// because the boxed detector is not `Sync`; the parsed model is cloneable.
pub struct CascadeLocalizer {
    model: rustface::Model,
    min_face_size: u32,
    score_thresh: f64,
    eye_band: EyeBandConfig,
}

impl CascadeLocalizer {
    /// Load a SeetaFace frontal model from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LocalizerError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| LocalizerError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let model = rustface::read_model(Cursor::new(bytes))
            .map_err(|e| LocalizerError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        info!("Loaded SeetaFace cascade model from {}", path.display());

        Ok(Self {
            model,
            min_face_size: 20,
            score_thresh: 2.0,
            eye_band: EyeBandConfig::default(),
        })
    }
}

impl SubjectLocalizer for CascadeLocalizer {
    fn detect_faces(&self, frame: &GrayImage) -> Vec<Region> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_thresh);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let mut faces = detector.detect(&rustface::ImageData::new(frame.as_raw(), width, height));
        // best candidate first; the pipeline consumes only the first region
        faces.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(Ordering::Equal)
        });
        debug!(count = faces.len(), "cascade face detection complete");

        faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                Region::clamped(
                    bbox.x(),
                    bbox.y(),
                    bbox.width(),
                    bbox.height(),
                    width,
                    height,
                )
            })
            .collect()
    }

    fn detect_eyes(&self, face: &GrayImage) -> Vec<Region> {
        propose_eye_regions(face, &self.eye_band)
    }
}
