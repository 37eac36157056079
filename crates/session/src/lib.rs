//! Session State for Exam Proctoring
//!
//! Owns everything that persists across frames of one monitored exam
//! attempt:
//! - the [`Session`] record (warning counters, away and blink timers,
//!   lifecycle)
//! - the [`MonitorPolicy`] thresholds (debounce, cooldown, long-blink,
//!   warning ceiling)
//! - the pure [`machine::assess`] state machine folding one
//!   [`FrameObservation`] into a session
//! - the [`SessionRegistry`] mapping session ids to independently locked
//!   sessions, replacing the process-wide globals such services tend to
//!   start with
//!
//! Timing is injected (`Instant` per call), so the debounce and cooldown
//! arithmetic is testable without sleeping.

pub mod machine;
pub mod observation;
pub mod policy;
pub mod registry;
pub mod session;

pub use machine::assess;
pub use observation::{FrameObservation, HeadPose, VerdictReport};
pub use policy::MonitorPolicy;
pub use registry::SessionRegistry;
pub use session::{Session, SessionLifecycle, SessionSnapshot};

use thiserror::Error;
use uuid::Uuid;

/// Session lookup and lifecycle failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("session {0} has ended")]
    Ended(Uuid),

    #[error("session registry lock poisoned")]
    LockPoisoned,
}
