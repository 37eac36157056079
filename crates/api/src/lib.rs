//! Attention Monitoring API Server
//!
//! REST surface over the proctoring engine: session lifecycle, frame
//! submission, and operational endpoints (health, Prometheus metrics).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use monitor::ProctorEngine;
use serde::Serialize;
use session::SessionError;
use thiserror::Error;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod rate_limit;
mod routes;

pub use self::config::ServiceConfig;

/// Application state shared across handlers
pub struct AppState {
    /// Monitoring engine shared by every session
    pub engine: Arc<ProctorEngine>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Set when a Prometheus recorder is installed; rendered by /metrics
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state around an engine
    pub fn new(engine: Arc<ProctorEngine>) -> Self {
        Self {
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the /metrics endpoint
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Errors surfaced by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no image data provided")]
    MissingImage,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("frame processing task failed")]
    FrameTask,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingImage => StatusCode::BAD_REQUEST,
            ApiError::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::Ended(_)) => StatusCode::CONFLICT,
            ApiError::Session(SessionError::LockPoisoned) | ApiError::FrameTask => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/sessions", post(routes::sessions::create))
        .route("/api/v1/sessions/:id", get(routes::sessions::get_session))
        .route("/api/v1/sessions/:id/start", post(routes::sessions::start))
        .route("/api/v1/sessions/:id/frames", post(routes::sessions::submit_frame))
        .route("/api/v1/sessions/:id/end", post(routes::sessions::end))
        .route(
            "/api/v1/sessions/:id/alerts/toggle",
            post(routes::sessions::toggle_alerts),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        active_sessions: state.engine.active_sessions(),
    })
}

/// Prometheus exposition handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed",
        )
            .into_response(),
    }
}

/// Initialize logging
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Run the server until the listener fails or the process is stopped
pub async fn run_server(config: ServiceConfig, engine: Arc<ProctorEngine>) -> anyhow::Result<()> {
    let recorder = PrometheusBuilder::new()
        .install_recorder()
        .context("installing Prometheus metrics recorder")?;

    let governor = rate_limit::create_governor_config(&config.rate_limit)
        .context("rate limit configuration rejected (zero interval or burst)")?;

    let state = Arc::new(AppState::new(engine).with_metrics(recorder));
    let app = create_router(state)
        .layer(GovernorLayer { config: governor })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!(addr = %config.bind_addr, "starting attention monitoring API server");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::{AlertEvent, Notifier};
    use axum::body::Body;
    use axum::http::{header, Request};
    use localizer::HeuristicLocalizer;
    use serde_json::{json, Value};
    use session::MonitorPolicy;
    use tower::ServiceExt;

    struct NullNotifier;

    impl Notifier for NullNotifier {
        fn notify(&self, _event: AlertEvent) {}
    }

    fn test_router() -> Router {
        let engine = Arc::new(ProctorEngine::new(
            Arc::new(HeuristicLocalizer::default()),
            Arc::new(NullNotifier),
            MonitorPolicy::default(),
        ));
        create_router(Arc::new(AppState::new(engine)))
    }

    async fn request(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn started_session(router: &Router) -> String {
        let (status, body) = request(router, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_reports_active_sessions() {
        let router = test_router();

        let (status, body) = request(&router, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["active_sessions"], 0);
        assert!(body["version"].is_string());

        started_session(&router).await;
        let (_, body) = request(&router, "GET", "/api/v1/health", None).await;
        assert_eq!(body["active_sessions"], 1);
    }

    #[tokio::test]
    async fn test_session_lifecycle_over_http() {
        let router = test_router();
        let id = started_session(&router).await;

        let (status, body) = request(&router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lifecycle"], "Active");
        assert_eq!(body["warnings"], 0);
        assert_eq!(body["violation_detected"], false);

        let (status, body) =
            request(&router, "POST", &format!("/api/v1/sessions/{id}/end"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ended");

        let (status, body) = request(
            &router,
            "POST",
            &format!("/api/v1/sessions/{id}/frames"),
            Some(json!({ "image": "zzzz" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("ended"));
    }

    #[tokio::test]
    async fn test_frame_requires_image_data() {
        let router = test_router();
        let id = started_session(&router).await;
        let uri = format!("/api/v1/sessions/{id}/frames");

        let (status, body) = request(&router, "POST", &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no image data provided");

        let (status, _) = request(&router, "POST", &uri, Some(json!({ "image": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparsable_payload_degrades_instead_of_failing() {
        let router = test_router();
        let id = started_session(&router).await;

        let (status, body) = request(
            &router,
            "POST",
            &format!("/api/v1/sessions/{id}/frames"),
            Some(json!({ "image": "data:image/png;base64,@@@" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].is_string());
        assert_eq!(body["face_detected"], false);
        assert_eq!(body["warnings"], 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let router = test_router();
        let ghost = uuid::Uuid::new_v4();

        let (status, body) =
            request(&router, "GET", &format!("/api/v1/sessions/{ghost}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let (status, _) = request(
            &router,
            "POST",
            &format!("/api/v1/sessions/{ghost}/frames"),
            Some(json!({ "image": "zzzz" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_toggle_alerts_over_http() {
        let router = test_router();
        let id = started_session(&router).await;
        let uri = format!("/api/v1/sessions/{id}/alerts/toggle");

        let (status, body) = request(&router, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alerts_enabled"], false);

        let (_, body) = request(&router, "POST", &uri, None).await;
        assert_eq!(body["alerts_enabled"], true);
    }

    #[tokio::test]
    async fn test_metrics_unavailable_without_recorder() {
        let router = test_router();
        let response = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
