//! Attention monitoring engine
//!
//! Composes the per-frame pipeline:
//! - decode the submitted image payload (`frame-codec`)
//! - localize the subject's face and eye regions (`localizer`)
//! - estimate gaze direction from the eye crop (`gaze`)
//! - fold the observation into the session state machine (`session`)
//!
//! The engine is synchronous per frame; alert delivery is the only side
//! effect and happens off the frame path through the session registry.

pub mod engine;

pub use engine::ProctorEngine;
