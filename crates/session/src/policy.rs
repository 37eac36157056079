//! Monitoring policy thresholds

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Behavioral thresholds for the session state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorPolicy {
    /// Continuous away time before a warning is considered (milliseconds)
    pub away_threshold_ms: u64,

    /// Minimum spacing between counted warnings (milliseconds)
    pub alert_cooldown_ms: u64,

    /// Eye closure time before an episode counts as a long blink (milliseconds)
    pub long_blink_threshold_ms: u64,

    /// Warning count at which a session becomes a violation
    pub max_warnings: u32,
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self {
            away_threshold_ms: 1500,
            alert_cooldown_ms: 5000,
            long_blink_threshold_ms: 2000,
            max_warnings: 3,
        }
    }
}

impl MonitorPolicy {
    /// Tighter thresholds for high-stakes exams
    pub fn strict() -> Self {
        Self {
            away_threshold_ms: 1000,
            alert_cooldown_ms: 3000,
            max_warnings: 2,
            ..Default::default()
        }
    }

    /// Looser thresholds for low-stakes quizzes
    pub fn lenient() -> Self {
        Self {
            away_threshold_ms: 2500,
            alert_cooldown_ms: 8000,
            max_warnings: 5,
            ..Default::default()
        }
    }

    pub fn away_threshold(&self) -> Duration {
        Duration::from_millis(self.away_threshold_ms)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_millis(self.alert_cooldown_ms)
    }

    pub fn long_blink_threshold(&self) -> Duration {
        Duration::from_millis(self.long_blink_threshold_ms)
    }
}
