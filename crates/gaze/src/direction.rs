//! Horizontal gaze direction classification

use serde::{Deserialize, Serialize};

/// Lower edge of the on-screen band (inclusive)
pub const CENTER_MIN: f64 = 0.3;

/// Upper edge of the on-screen band (inclusive)
pub const CENTER_MAX: f64 = 0.7;

/// Coarse horizontal gaze direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GazeDirection {
    Left,
    Center,
    Right,
    /// No usable eye signal (face absent or eyes closed)
    #[default]
    Unknown,
}

/// Classify a normalized pupil position against the center band.
///
/// The band is a closed interval: both edges count as Center.
pub fn classify(relative_x: f64) -> GazeDirection {
    if (CENTER_MIN..=CENTER_MAX).contains(&relative_x) {
        GazeDirection::Center
    } else if relative_x < CENTER_MIN {
        GazeDirection::Left
    } else {
        GazeDirection::Right
    }
}
