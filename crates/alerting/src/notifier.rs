//! Notifier implementations

use tokio::sync::mpsc;
use tracing::warn;

use crate::{AlertEvent, Notifier};

/// Logs every escalation; audible ones ring the terminal bell.
///
/// Default sink for single-process deployments, mirroring the console
/// beeper such services started out with.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: AlertEvent) {
        if event.is_violation() {
            warn!(
                session = %event.session_id,
                warnings = event.warnings,
                "violation threshold reached"
            );
        } else {
            warn!(
                session = %event.session_id,
                warnings = event.warnings,
                max_warnings = event.max_warnings,
                "attention warning"
            );
        }
        if event.audible {
            // terminal bell; inert under non-tty sinks
            eprint!("\x07");
        }
    }
}

/// Forwards escalations into a bounded channel for an async worker.
///
/// Uses `try_send` so the frame path never blocks; when the queue is full
/// the event is dropped with a warning. Delivery is best-effort by
/// contract and detection state never depends on it.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<AlertEvent>,
}

impl ChannelNotifier {
    /// Create a notifier plus the receiving end for the worker task
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<AlertEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: AlertEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("alert event dropped: {}", e);
        }
    }
}
