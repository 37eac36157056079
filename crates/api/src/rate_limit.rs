//! Per-IP rate limiting using the GCRA algorithm
//!
//! Built on tower_governor. Sized for webcam frame streams: clients
//! submit roughly five frames per second per session, so the default
//! replenishes one request every 200 ms with enough burst to absorb
//! reconnect catch-up.

use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Type alias for the governor config with default settings
/// StateInformationMiddleware is used when use_headers() is called to add X-RateLimit-* headers
pub type DefaultGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Milliseconds to replenish one request slot
    pub replenish_interval_ms: u64,
    /// Burst size (max requests that can be made immediately)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            replenish_interval_ms: 200, // 5 requests/second steady state
            burst_size: 20,
        }
    }
}

/// Create a rate limiting governor config.
///
/// Returns an Arc wrapped config that can be used with GovernorLayer.
/// Uses PeerIpKeyExtractor, so the service must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` for IP extraction.
/// Returns None when either knob is zero.
///
/// Adds X-RateLimit-* headers to responses for quota visibility.
pub fn create_governor_config(config: &RateLimitConfig) -> Option<Arc<DefaultGovernorConfig>> {
    GovernorConfigBuilder::default()
        .per_millisecond(config.replenish_interval_ms)
        .burst_size(config.burst_size)
        .use_headers() // Adds X-RateLimit-After, X-RateLimit-Limit, X-RateLimit-Remaining
        .finish()
        .map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_frame_rate() {
        let config = RateLimitConfig::default();
        assert_eq!(config.replenish_interval_ms, 200);
        assert_eq!(config.burst_size, 20);
    }

    #[test]
    fn test_create_governor_config() {
        let config = RateLimitConfig::default();
        assert!(create_governor_config(&config).is_some());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = RateLimitConfig {
            replenish_interval_ms: 0,
            burst_size: 20,
        };
        assert!(create_governor_config(&config).is_none());
    }
}
