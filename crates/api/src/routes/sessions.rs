//! Session Routes
//!
//! The frame endpoint runs the vision pipeline under `spawn_blocking`
//! so decode and detection never stall the async workers; everything
//! else is a quick registry operation.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{ApiError, AppState};
use session::{SessionSnapshot, VerdictReport};

/// Request body for the frame endpoint
#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    /// Data-URL or bare base64 image payload
    pub image: Option<String>,
}

/// Response for session creation and restart
#[derive(Debug, Serialize)]
pub struct SessionStarted {
    pub session_id: Uuid,
    pub status: &'static str,
}

/// Response for session end
#[derive(Debug, Serialize)]
pub struct SessionEnded {
    pub session_id: Uuid,
    pub status: &'static str,
}

/// Response for the alert toggle
#[derive(Debug, Serialize)]
pub struct AlertsToggled {
    pub session_id: Uuid,
    pub alerts_enabled: bool,
}

/// Create a session under a fresh id and start monitoring it
pub async fn create(State(state): State<Arc<AppState>>) -> Result<Json<SessionStarted>, ApiError> {
    let session_id = state.engine.create_session()?;
    Ok(Json(SessionStarted {
        session_id,
        status: "started",
    }))
}

/// Start (or reset) the session with a caller-chosen id
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStarted>, ApiError> {
    state.engine.start_session(id)?;
    Ok(Json(SessionStarted {
        session_id: id,
        status: "started",
    }))
}

/// Submit one webcam frame and get the behavioral verdict
pub async fn submit_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<FrameRequest>,
) -> Result<Json<VerdictReport>, ApiError> {
    let payload = match request.image {
        Some(image) if !image.is_empty() => image,
        _ => return Err(ApiError::MissingImage),
    };

    let engine = state.engine.clone();
    let report = tokio::task::spawn_blocking(move || engine.submit_frame(id, &payload))
        .await
        .map_err(|_| ApiError::FrameTask)??;
    Ok(Json(report))
}

/// End the session; later frames for this id get a conflict response
pub async fn end(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionEnded>, ApiError> {
    state.engine.end_session(id)?;
    Ok(Json(SessionEnded {
        session_id: id,
        status: "ended",
    }))
}

/// Flip audible alerting for the session
pub async fn toggle_alerts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertsToggled>, ApiError> {
    let alerts_enabled = state.engine.toggle_alerts(id)?;
    Ok(Json(AlertsToggled {
        session_id: id,
        alerts_enabled,
    }))
}

/// Current session counters and lifecycle
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    Ok(Json(state.engine.session(id)?))
}
