//! The warning state machine
//!
//! Two-level hysteresis over away-ness: an inner debounce (the candidate
//! must stay away strictly longer than the threshold before a warning is
//! considered) and an outer throttle (once counted, further counting is
//! suppressed for the cooldown, even if the candidate stays away). At most
//! one warning is counted per cooldown window no matter how many frames
//! arrive.
//!
//! Blink episodes run on their own timer: eye closure strictly longer than
//! the long-blink threshold counts once per episode, latched until the
//! eyes reopen. Blink-candidate frames still feed the away logic, since a
//! candidate with closed eyes is not looking at the screen.

use std::time::{Duration, Instant};

use alerting::AlertEvent;
use chrono::Utc;
use gaze::GazeDirection;
use tracing::debug;
use uuid::Uuid;

use crate::{FrameObservation, HeadPose, MonitorPolicy, Session, VerdictReport};

/// Fold one observation into the session at time `now`.
///
/// Returns the frame verdict plus at most one alert event when a warning
/// was counted. The caller owns dispatch; session state is already
/// consistent before the event leaves this function, so a lost event never
/// desynchronizes counters. Lifecycle is not checked here; the registry
/// rejects frames for inactive sessions.
pub fn assess(
    session: &mut Session,
    session_id: Uuid,
    observation: &FrameObservation,
    now: Instant,
    policy: &MonitorPolicy,
) -> (VerdictReport, Option<AlertEvent>) {
    let blink_duration = track_blink(session, observation, now, policy);

    let looking_at_screen = observation.face_detected && observation.gaze == GazeDirection::Center;

    let mut alert = None;
    if looking_at_screen {
        // looking back clears the debounce only; the cooldown spans episodes
        session.away_since = None;
    } else {
        match session.away_since {
            None => {
                // first away frame arms the debounce, never alerts
                session.away_since = Some(now);
            }
            Some(since) => {
                let elapsed = now.duration_since(since);
                if elapsed > policy.away_threshold() && cooldown_clear(session, now, policy) {
                    session.last_alert_at = Some(now);
                    session.warnings += 1;
                    debug!(
                        session = %session_id,
                        warnings = session.warnings,
                        away_for_ms = elapsed.as_millis() as u64,
                        "warning counted"
                    );
                    alert = Some(AlertEvent {
                        session_id,
                        warnings: session.warnings,
                        max_warnings: policy.max_warnings,
                        audible: session.alerts_enabled,
                        at: Utc::now(),
                    });
                }
            }
        }
    }

    let report = VerdictReport {
        face_detected: observation.face_detected,
        looking_at_screen,
        warnings: session.warnings,
        max_warnings: policy.max_warnings,
        violation_detected: session.warnings >= policy.max_warnings,
        look_direction: observation.gaze,
        eyes_closed: observation.eyes_closed,
        blink_duration: blink_duration.as_secs_f64(),
        long_blink_count: session.long_blink_count,
        head_pose: HeadPose::default(),
        ear: 0.0,
        error: None,
    };

    (report, alert)
}

/// Advance the blink timer, counting a long blink once per closure episode
fn track_blink(
    session: &mut Session,
    observation: &FrameObservation,
    now: Instant,
    policy: &MonitorPolicy,
) -> Duration {
    if observation.face_detected && observation.eyes_closed {
        let since = *session.blink_since.get_or_insert(now);
        let duration = now.duration_since(since);
        if duration > policy.long_blink_threshold() && !session.long_blink_latched {
            session.long_blink_count += 1;
            session.long_blink_latched = true;
            debug!(count = session.long_blink_count, "long blink counted");
        }
        duration
    } else {
        session.blink_since = None;
        session.long_blink_latched = false;
        Duration::ZERO
    }
}

fn cooldown_clear(session: &Session, now: Instant, policy: &MonitorPolicy) -> bool {
    session
        .last_alert_at
        .map_or(true, |last| now.duration_since(last) > policy.alert_cooldown())
}
