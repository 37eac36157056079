//! Frame-processing engine and session operations
//!
//! One `ProctorEngine` serves every session. Each call is synchronous
//! and non-suspending; per-session ordering is the caller's contract
//! (frames for one session must arrive in timestamp order), while
//! distinct sessions proceed in parallel through the registry.

use std::sync::Arc;
use std::time::Instant;

use alerting::Notifier;
use image::GrayImage;
use localizer::SubjectLocalizer;
use metrics::counter;
use session::{
    FrameObservation, MonitorPolicy, SessionError, SessionRegistry, SessionSnapshot, VerdictReport,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Attention monitoring engine: decode, localize, estimate, assess
pub struct ProctorEngine {
    localizer: Arc<dyn SubjectLocalizer>,
    registry: SessionRegistry,
}

impl ProctorEngine {
    pub fn new(
        localizer: Arc<dyn SubjectLocalizer>,
        notifier: Arc<dyn Notifier>,
        policy: MonitorPolicy,
    ) -> Self {
        Self {
            localizer,
            registry: SessionRegistry::new(policy, notifier),
        }
    }

    /// Mint a fresh session id and start monitoring it
    pub fn create_session(&self) -> Result<Uuid, SessionError> {
        let id = Uuid::new_v4();
        self.registry.start(id)?;
        Ok(id)
    }

    /// Create-or-reset the session with this id and set it Active
    pub fn start_session(&self, id: Uuid) -> Result<(), SessionError> {
        self.registry.start(id)
    }

    /// Process one frame against the wall clock
    pub fn submit_frame(&self, id: Uuid, payload: &str) -> Result<VerdictReport, SessionError> {
        self.submit_frame_at(id, payload, Instant::now())
    }

    /// Process one frame against the session clock `now`.
    ///
    /// Public so recorded streams can be replayed with their capture
    /// timestamps; the service layer passes `Instant::now()`. A missing
    /// or ended session is reported before the payload is even decoded;
    /// a payload that fails to decode yields a degraded report with the
    /// session counters unchanged.
    pub fn submit_frame_at(
        &self,
        id: Uuid,
        payload: &str,
        now: Instant,
    ) -> Result<VerdictReport, SessionError> {
        self.registry.ensure_active(id)?;
        counter!("proctor_frames_total").increment(1);

        let frame = match frame_codec::decode_payload(payload) {
            Ok(frame) => frame,
            Err(err) => {
                counter!("proctor_frames_failed_total").increment(1);
                warn!(session = %id, error = %err, "frame decode failed, reporting degraded");
                return self.registry.degraded_report(id, err.to_string());
            }
        };

        let observation = self.observe_frame(&frame.gray);
        self.registry.observe(id, &observation, now)
    }

    /// End the session; later frames for this id are rejected
    pub fn end_session(&self, id: Uuid) -> Result<(), SessionError> {
        self.registry.end(id)
    }

    /// Flip audible alerting for the session, returning the new setting
    pub fn toggle_alerts(&self, id: Uuid) -> Result<bool, SessionError> {
        self.registry.toggle_alerts(id)
    }

    pub fn session(&self, id: Uuid) -> Result<SessionSnapshot, SessionError> {
        self.registry.snapshot(id)
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.active_count()
    }

    /// Reduce one grayscale frame to the facts the state machine consumes.
    ///
    /// Single subject by contract: only the best-ranked face and its first
    /// eye region are considered. A face with no usable eye region is a
    /// blink candidate, not an error.
    fn observe_frame(&self, gray: &GrayImage) -> FrameObservation {
        let faces = self.localizer.detect_faces(gray);
        let face_region = match faces.first() {
            Some(region) => *region,
            None => return FrameObservation::no_face(),
        };

        let face = face_region.crop_from(gray);
        let eyes = self.localizer.detect_eyes(&face);
        let eye_region = match eyes.first() {
            Some(region) => *region,
            None => return FrameObservation::blink(),
        };

        let eye = eye_region.crop_from(&face);
        let estimate = gaze::estimate(&eye);
        debug!(
            direction = ?estimate.direction,
            relative_x = estimate.relative_x,
            "gaze estimated"
        );
        FrameObservation::gazing(estimate.direction)
    }
}
