//! Frame observations and verdict reports

use gaze::GazeDirection;
use serde::{Deserialize, Serialize};

use crate::{MonitorPolicy, Session};

/// Head pose Euler angles. Reserved: pose estimation is out of scope and
/// the engine always reports neutral zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Detector facts for one frame.
///
/// `eyes_closed` implies `gaze == Unknown`; a blink-candidate frame has no
/// usable gaze signal. Blink duration is derived by the state machine from
/// its own timer, it is not an observed fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameObservation {
    pub face_detected: bool,
    pub eyes_closed: bool,
    pub gaze: GazeDirection,
}

impl FrameObservation {
    /// No face anywhere in the frame
    pub fn no_face() -> Self {
        Self {
            face_detected: false,
            eyes_closed: false,
            gaze: GazeDirection::Unknown,
        }
    }

    /// Face present but no eye region: the blink-candidate signal
    pub fn blink() -> Self {
        Self {
            face_detected: true,
            eyes_closed: true,
            gaze: GazeDirection::Unknown,
        }
    }

    /// Face and eye present with a classified gaze
    pub fn gazing(gaze: GazeDirection) -> Self {
        Self {
            face_detected: true,
            eyes_closed: false,
            gaze,
        }
    }
}

/// Engine output for one submitted frame.
///
/// Field names are the service's public wire contract; clients bind to
/// them directly, so renames here are breaking changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictReport {
    pub face_detected: bool,
    pub looking_at_screen: bool,
    pub warnings: u32,
    pub max_warnings: u32,
    pub violation_detected: bool,
    pub look_direction: GazeDirection,
    pub eyes_closed: bool,
    /// Length of the current eye-closure episode, in seconds
    pub blink_duration: f64,
    pub long_blink_count: u32,
    /// Reserved, always neutral
    pub head_pose: HeadPose,
    /// Reserved eye aspect ratio, always zero
    pub ear: f32,
    /// Set when this frame failed to decode or process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerdictReport {
    /// Report for a frame that never produced an observation: counters as
    /// they stand, no face, direction Unknown, the failure attached.
    ///
    /// `violation_detected` stays derived from the live counter even here.
    pub fn degraded(session: &Session, policy: &MonitorPolicy, error: impl Into<String>) -> Self {
        Self {
            face_detected: false,
            looking_at_screen: false,
            warnings: session.warnings,
            max_warnings: policy.max_warnings,
            violation_detected: session.warnings >= policy.max_warnings,
            look_direction: GazeDirection::Unknown,
            eyes_closed: false,
            blink_duration: 0.0,
            long_blink_count: session.long_blink_count,
            head_pose: HeadPose::default(),
            ear: 0.0,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_candidate_has_no_gaze() {
        let obs = FrameObservation::blink();
        assert!(obs.face_detected);
        assert!(obs.eyes_closed);
        assert_eq!(obs.gaze, GazeDirection::Unknown);
    }

    #[test]
    fn test_error_field_omitted_when_absent() {
        let mut session = Session::default();
        session.start();
        let policy = MonitorPolicy::default();

        let mut report = VerdictReport::degraded(&session, &policy, "bad payload");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"], "bad payload");
        assert_eq!(json["face_detected"], false);
        assert_eq!(json["look_direction"], "Unknown");

        report.error = None;
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_degraded_report_derives_violation() {
        let mut session = Session::default();
        session.start();
        session.warnings = 3;
        let policy = MonitorPolicy::default();

        let report = VerdictReport::degraded(&session, &policy, "decode failed");
        assert!(report.violation_detected);
        assert_eq!(report.warnings, 3);
    }
}
