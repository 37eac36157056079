//! Per-candidate session record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// Where a session is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionLifecycle {
    /// Created but not yet monitoring
    #[default]
    Idle,
    /// Accepting frames
    Active,
    /// Monitoring finished; frames are rejected
    Ended,
}

/// Mutable monitoring state for one exam attempt.
///
/// Timers are `Instant`-based and never serialized; the wire-visible away
/// flag is simply `away_since.is_some()`.
#[derive(Debug, Clone)]
pub struct Session {
    /// Counted warnings; never decreases while Active
    pub warnings: u32,
    /// Whether escalations fire the audible cue; survives start/end,
    /// changed only by an explicit toggle
    pub alerts_enabled: bool,
    /// Instant the current away episode began, if any
    pub away_since: Option<Instant>,
    /// Instant the last counted warning fired
    pub last_alert_at: Option<Instant>,
    /// Completed long-blink episodes
    pub long_blink_count: u32,
    /// Instant the current eye-closure episode began, if any
    pub blink_since: Option<Instant>,
    /// Whether the current closure episode was already counted long
    pub long_blink_latched: bool,
    pub lifecycle: SessionLifecycle,
    pub started_at: DateTime<Utc>,
    /// Set on end; drives registry retention of finished sessions
    pub ended_at: Option<Instant>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            warnings: 0,
            alerts_enabled: true,
            away_since: None,
            last_alert_at: None,
            long_blink_count: 0,
            blink_since: None,
            long_blink_latched: false,
            lifecycle: SessionLifecycle::Idle,
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

impl Session {
    /// Begin (or re-begin) monitoring: counters and timers reset,
    /// lifecycle Active. `alerts_enabled` deliberately survives.
    pub fn start(&mut self) {
        self.reset_detection_state();
        self.lifecycle = SessionLifecycle::Active;
        self.started_at = Utc::now();
        self.ended_at = None;
    }

    /// Stop monitoring: same reset as [`Session::start`], lifecycle Ended.
    pub fn end(&mut self) {
        self.reset_detection_state();
        self.lifecycle = SessionLifecycle::Ended;
        self.ended_at = Some(Instant::now());
    }

    fn reset_detection_state(&mut self) {
        self.warnings = 0;
        self.long_blink_count = 0;
        self.away_since = None;
        self.last_alert_at = None;
        self.blink_since = None;
        self.long_blink_latched = false;
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == SessionLifecycle::Active
    }
}

/// Read-only view of a session for status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub lifecycle: SessionLifecycle,
    pub warnings: u32,
    pub max_warnings: u32,
    pub violation_detected: bool,
    pub long_blink_count: u32,
    pub alerts_enabled: bool,
    pub away: bool,
    pub started_at: DateTime<Utc>,
}
