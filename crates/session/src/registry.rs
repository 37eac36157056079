//! Thread-safe session registry
//!
//! Replaces the process-wide globals of first-generation proctoring
//! services with a map of independently locked sessions: frames for
//! different candidates proceed in parallel, frames for one candidate
//! serialize behind that session's mutex (the state machine is only
//! correct under in-order timestamps per session).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use alerting::Notifier;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    assess, FrameObservation, MonitorPolicy, Session, SessionError, SessionSnapshot, VerdictReport,
};

/// How long ended sessions linger before they are pruned
const DEFAULT_ENDED_RETENTION: Duration = Duration::from_secs(3600);

/// Registry of concurrently monitored sessions
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
    policy: MonitorPolicy,
    notifier: Arc<dyn Notifier>,
    ended_retention: Duration,
}

impl SessionRegistry {
    pub fn new(policy: MonitorPolicy, notifier: Arc<dyn Notifier>) -> Self {
        info!(
            away_threshold_ms = policy.away_threshold_ms,
            alert_cooldown_ms = policy.alert_cooldown_ms,
            max_warnings = policy.max_warnings,
            "creating session registry"
        );
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
            notifier,
            ended_retention: DEFAULT_ENDED_RETENTION,
        }
    }

    /// Override how long ended sessions linger before pruning
    pub fn with_ended_retention(mut self, retention: Duration) -> Self {
        self.ended_retention = retention;
        self
    }

    pub fn policy(&self) -> &MonitorPolicy {
        &self.policy
    }

    /// Create-or-reset the session with this id and set it Active.
    ///
    /// Restarting an existing id zeroes its counters while preserving its
    /// alert preference. Stale ended sessions are pruned on the way in.
    pub fn start(&self, id: Uuid) -> Result<(), SessionError> {
        self.prune_ended()?;

        let handle = {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|_| SessionError::LockPoisoned)?;
            sessions
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
                .clone()
        };

        let mut session = handle.lock().map_err(|_| SessionError::LockPoisoned)?;
        session.start();
        debug!(session = %id, "session started");
        Ok(())
    }

    /// Fold one observation into the session at time `now`.
    ///
    /// At most one alert event is dispatched per call, after the session
    /// lock is released, so a slow sink never extends the critical section.
    pub fn observe(
        &self,
        id: Uuid,
        observation: &FrameObservation,
        now: Instant,
    ) -> Result<VerdictReport, SessionError> {
        let handle = self.handle(id)?;

        let (report, alert) = {
            let mut session = handle.lock().map_err(|_| SessionError::LockPoisoned)?;
            if !session.is_active() {
                return Err(SessionError::Ended(id));
            }
            assess(&mut session, id, observation, now, &self.policy)
        };

        if let Some(event) = alert {
            self.notifier.notify(event);
        }
        Ok(report)
    }

    /// Check that the session exists and accepts frames.
    ///
    /// Lets callers rank a missing session above a bad payload before
    /// doing any decode work.
    pub fn ensure_active(&self, id: Uuid) -> Result<(), SessionError> {
        let handle = self.handle(id)?;
        let session = handle.lock().map_err(|_| SessionError::LockPoisoned)?;
        if !session.is_active() {
            return Err(SessionError::Ended(id));
        }
        Ok(())
    }

    /// Report for a frame that produced no observation (decode failure):
    /// counters unchanged, the error attached, no state mutation.
    pub fn degraded_report(
        &self,
        id: Uuid,
        error: impl Into<String>,
    ) -> Result<VerdictReport, SessionError> {
        let handle = self.handle(id)?;
        let session = handle.lock().map_err(|_| SessionError::LockPoisoned)?;
        if !session.is_active() {
            return Err(SessionError::Ended(id));
        }
        Ok(VerdictReport::degraded(&session, &self.policy, error))
    }

    /// End the session; takes effect before any later frame for this id.
    /// Ending an already-ended session is a no-op.
    pub fn end(&self, id: Uuid) -> Result<(), SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().map_err(|_| SessionError::LockPoisoned)?;
        session.end();
        debug!(session = %id, "session ended");
        Ok(())
    }

    /// Flip the audible-alert setting, returning the new value
    pub fn toggle_alerts(&self, id: Uuid) -> Result<bool, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().map_err(|_| SessionError::LockPoisoned)?;
        session.alerts_enabled = !session.alerts_enabled;
        info!(session = %id, enabled = session.alerts_enabled, "alerts toggled");
        Ok(session.alerts_enabled)
    }

    pub fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, SessionError> {
        let handle = self.handle(id)?;
        let session = handle.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(SessionSnapshot {
            session_id: id,
            lifecycle: session.lifecycle,
            warnings: session.warnings,
            max_warnings: self.policy.max_warnings,
            violation_detected: session.warnings >= self.policy.max_warnings,
            long_blink_count: session.long_blink_count,
            alerts_enabled: session.alerts_enabled,
            away: session.away_since.is_some(),
            started_at: session.started_at,
        })
    }

    /// Number of sessions currently accepting frames
    pub fn active_count(&self) -> usize {
        self.sessions
            .read()
            .map(|sessions| {
                sessions
                    .values()
                    .filter(|handle| handle.lock().map(|s| s.is_active()).unwrap_or(false))
                    .count()
            })
            .unwrap_or(0)
    }

    fn handle(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, SessionError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::LockPoisoned)?;
        sessions.get(&id).cloned().ok_or(SessionError::NotFound(id))
    }

    fn prune_ended(&self) -> Result<(), SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;
        let retention = self.ended_retention;
        sessions.retain(|_, handle| {
            handle
                .lock()
                .map(|session| match session.ended_at {
                    Some(ended) => ended.elapsed() < retention,
                    None => true,
                })
                .unwrap_or(false)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::AlertEvent;
    use gaze::GazeDirection;

    #[derive(Default)]
    struct CountingNotifier {
        events: Mutex<Vec<AlertEvent>>,
    }

    impl Notifier for CountingNotifier {
        fn notify(&self, event: AlertEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn registry() -> (SessionRegistry, Arc<CountingNotifier>) {
        let notifier = Arc::new(CountingNotifier::default());
        let registry = SessionRegistry::new(MonitorPolicy::default(), notifier.clone());
        (registry, notifier)
    }

    fn away_streak(registry: &SessionRegistry, id: Uuid, base: Instant, through_ms: u64) {
        for ms in (0..=through_ms).step_by(200) {
            registry
                .observe(
                    id,
                    &FrameObservation::no_face(),
                    base + Duration::from_millis(ms),
                )
                .unwrap();
        }
    }

    #[test]
    fn test_start_creates_fresh_session() {
        let (registry, _) = registry();
        let id = Uuid::new_v4();
        registry.start(id).unwrap();

        let snapshot = registry.snapshot(id).unwrap();
        assert_eq!(snapshot.warnings, 0);
        assert_eq!(snapshot.long_blink_count, 0);
        assert!(snapshot.alerts_enabled);
        assert_eq!(snapshot.lifecycle, crate::SessionLifecycle::Active);
    }

    #[test]
    fn test_restart_resets_counters_but_keeps_alert_preference() {
        let (registry, _) = registry();
        let id = Uuid::new_v4();
        registry.start(id).unwrap();
        away_streak(&registry, id, Instant::now(), 2000);
        assert!(!registry.toggle_alerts(id).unwrap());
        assert_eq!(registry.snapshot(id).unwrap().warnings, 1);

        registry.start(id).unwrap();

        let snapshot = registry.snapshot(id).unwrap();
        assert_eq!(snapshot.warnings, 0);
        assert!(!snapshot.alerts_enabled, "toggle survives a restart");
    }

    #[test]
    fn test_unknown_session_is_reported() {
        let (registry, _) = registry();
        let id = Uuid::new_v4();

        let err = registry
            .observe(id, &FrameObservation::no_face(), Instant::now())
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound(id));
        assert_eq!(
            registry.degraded_report(id, "boom").unwrap_err(),
            SessionError::NotFound(id)
        );
    }

    #[test]
    fn test_frames_rejected_after_end() {
        let (registry, _) = registry();
        let id = Uuid::new_v4();
        registry.start(id).unwrap();
        registry.end(id).unwrap();

        let err = registry
            .observe(
                id,
                &FrameObservation::gazing(GazeDirection::Center),
                Instant::now(),
            )
            .unwrap_err();
        assert_eq!(err, SessionError::Ended(id));

        // ending again stays a no-op
        registry.end(id).unwrap();
    }

    #[test]
    fn test_observe_counts_and_dispatches() {
        let (registry, notifier) = registry();
        let id = Uuid::new_v4();
        registry.start(id).unwrap();

        away_streak(&registry, id, Instant::now(), 2000);

        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].session_id, id);
        assert_eq!(events[0].warnings, 1);
        assert!(events[0].audible);
    }

    #[test]
    fn test_degraded_report_mutates_nothing() {
        let (registry, _) = registry();
        let id = Uuid::new_v4();
        registry.start(id).unwrap();
        away_streak(&registry, id, Instant::now(), 2000);
        let before = registry.snapshot(id).unwrap();

        let report = registry.degraded_report(id, "invalid base64 payload").unwrap();
        assert_eq!(report.error.as_deref(), Some("invalid base64 payload"));
        assert!(!report.face_detected);
        assert_eq!(report.warnings, before.warnings);

        let after = registry.snapshot(id).unwrap();
        assert_eq!(after.warnings, before.warnings);
        assert_eq!(after.away, before.away);
    }

    #[test]
    fn test_toggle_roundtrip() {
        let (registry, _) = registry();
        let id = Uuid::new_v4();
        registry.start(id).unwrap();

        assert!(!registry.toggle_alerts(id).unwrap());
        assert!(registry.toggle_alerts(id).unwrap());
        assert!(registry.snapshot(id).unwrap().alerts_enabled);
    }

    #[test]
    fn test_sessions_are_independent() {
        let (registry, _) = registry();
        let base = Instant::now();
        let away = Uuid::new_v4();
        let attentive = Uuid::new_v4();
        registry.start(away).unwrap();
        registry.start(attentive).unwrap();

        for ms in (0..=2000).step_by(200) {
            let now = base + Duration::from_millis(ms);
            registry
                .observe(away, &FrameObservation::no_face(), now)
                .unwrap();
            registry
                .observe(attentive, &FrameObservation::gazing(GazeDirection::Center), now)
                .unwrap();
        }

        assert_eq!(registry.snapshot(away).unwrap().warnings, 1);
        assert_eq!(registry.snapshot(attentive).unwrap().warnings, 0);
    }

    #[test]
    fn test_ended_sessions_prune_after_retention() {
        let (registry, _) = registry();
        let registry = registry.with_ended_retention(Duration::ZERO);
        let stale = Uuid::new_v4();
        registry.start(stale).unwrap();
        registry.end(stale).unwrap();

        // pruning runs on the next start
        let fresh = Uuid::new_v4();
        registry.start(fresh).unwrap();

        assert_eq!(
            registry.snapshot(stale).unwrap_err(),
            SessionError::NotFound(stale)
        );
        assert!(registry.snapshot(fresh).is_ok());
    }

    #[test]
    fn test_active_count_tracks_lifecycle() {
        let (registry, _) = registry();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        registry.start(a).unwrap();
        registry.start(b).unwrap();
        assert_eq!(registry.active_count(), 2);

        registry.end(a).unwrap();
        assert_eq!(registry.active_count(), 1);
    }
}
