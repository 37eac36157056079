//! Alert Dispatch for Proctoring Sessions
//!
//! Carries counted warning escalations from the session state machine to
//! whatever cares about them. Dispatch is deliberately fire-and-forget:
//! the [`Notifier`] capability is infallible at the call site, failures
//! are logged and dropped, and a slow or broken sink can never stall or
//! corrupt frame processing.

mod notifier;

pub use notifier::{ChannelNotifier, LogNotifier};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A counted warning escalation for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Session the warning belongs to
    pub session_id: Uuid,
    /// Warning count after this escalation
    pub warnings: u32,
    /// Warning ceiling; reaching it means a violation
    pub max_warnings: u32,
    /// Whether the audible cue should fire. False while the session has
    /// alerts disabled; the count above stands either way.
    pub audible: bool,
    /// When the warning was counted
    pub at: DateTime<Utc>,
}

impl AlertEvent {
    /// Whether this escalation reached the violation ceiling
    pub fn is_violation(&self) -> bool {
        self.warnings >= self.max_warnings
    }
}

/// Alert sink capability.
///
/// Called on the frame path right after the session lock is released, so
/// implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: AlertEvent);
}
