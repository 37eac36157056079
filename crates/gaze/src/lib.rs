//! Gaze Estimation from Eye Crops
//!
//! Isolates the pupil inside a grayscale eye crop and classifies the
//! horizontal gaze direction:
//! 1. binarize at a fixed intensity with inverted polarity (dark pupil
//!    becomes foreground)
//! 2. one pass of 3x3 morphological opening to drop speckle noise
//! 3. largest external contour by shoelace area, small blobs rejected
//! 4. polygon-moment centroid, normalized to the crop width
//! 5. classification against a fixed center band
//!
//! Estimation is infallible: every degenerate input (empty crop, no
//! contours, sub-noise area, zero moments) collapses to the neutral
//! Center fix, so an unreadable eye never penalizes the candidate.

pub mod direction;
pub mod pupil;

pub use direction::{classify, GazeDirection, CENTER_MAX, CENTER_MIN};
pub use pupil::{estimate, GazeEstimate, MIN_PUPIL_AREA, PUPIL_INTENSITY_THRESHOLD};
