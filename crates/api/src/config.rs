//! Service configuration
//!
//! Layered the usual way: built-in defaults, then an optional
//! `proctor.toml` next to the binary, then `PROCTOR_*` environment
//! variables (double underscore for nesting, e.g.
//! `PROCTOR_LOCALIZER__BACKEND=heuristic`).

use serde::{Deserialize, Serialize};
use session::MonitorPolicy;

use crate::rate_limit::RateLimitConfig;

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds
    pub bind_addr: String,

    /// Face and eye localizer backend
    pub localizer: LocalizerConfig,

    /// Session monitoring thresholds
    pub policy: MonitorPolicy,

    /// Per-IP request throttling
    pub rate_limit: RateLimitConfig,

    /// Depth of the bounded queue between the engine and the alert worker
    pub alert_queue_depth: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            localizer: LocalizerConfig::default(),
            policy: MonitorPolicy::default(),
            rate_limit: RateLimitConfig::default(),
            alert_queue_depth: 64,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file and environment overlays
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("proctor").required(false))
            .add_source(config::Environment::with_prefix("PROCTOR").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Localizer backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    pub backend: LocalizerBackend,

    /// Detection model consumed by the cascade backend
    pub model_path: String,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            backend: LocalizerBackend::Cascade,
            model_path: "models/seeta_fd_frontal_v1.0.bin".to_string(),
        }
    }
}

/// Available face/eye localizer implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalizerBackend {
    /// SeetaFace cascade; requires a model file, fatal when missing
    Cascade,
    /// Brightness-variance heuristic; model-free, for dev and tests
    Heuristic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_serveable() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.localizer.backend, LocalizerBackend::Cascade);
        assert!(config.alert_queue_depth > 0);
    }

    #[test]
    fn test_backend_parses_from_lowercase() {
        let backend: LocalizerBackend = serde_json::from_str("\"heuristic\"").unwrap();
        assert_eq!(backend, LocalizerBackend::Heuristic);
    }

    #[test]
    fn test_policy_overlay_keeps_other_defaults() {
        let parsed: ServiceConfig =
            serde_json::from_str(r#"{ "policy": { "max_warnings": 5 } }"#).unwrap();
        assert_eq!(parsed.policy.max_warnings, 5);
        assert_eq!(parsed.policy.away_threshold_ms, 1500);
        assert_eq!(parsed.rate_limit.burst_size, 20);
    }
}
