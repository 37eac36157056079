//! Attention monitoring service entry point
//!
//! Wires configuration, the localizer backend, the alert worker, and
//! the HTTP server together. A cascade backend with a missing model
//! file aborts startup; once the server is up, per-frame failures are
//! reported in the verdict and never stop the service.

use std::sync::Arc;

use alerting::{ChannelNotifier, LogNotifier, Notifier};
use anyhow::Context;
use api::config::{LocalizerBackend, LocalizerConfig};
use api::{init_logging, run_server, ServiceConfig};
use localizer::{CascadeLocalizer, HeuristicLocalizer, SubjectLocalizer};
use metrics::counter;
use monitor::ProctorEngine;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = ServiceConfig::load().context("loading service configuration")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.localizer.backend,
        "starting attention monitoring service"
    );

    let localizer = build_localizer(&config.localizer)?;

    let (notifier, mut alerts) = ChannelNotifier::bounded(config.alert_queue_depth);
    tokio::spawn(async move {
        let sink = LogNotifier;
        while let Some(event) = alerts.recv().await {
            counter!("proctor_alerts_total").increment(1);
            sink.notify(event);
        }
    });

    let engine = Arc::new(ProctorEngine::new(
        localizer,
        Arc::new(notifier),
        config.policy.clone(),
    ));

    run_server(config, engine).await
}

fn build_localizer(config: &LocalizerConfig) -> anyhow::Result<Arc<dyn SubjectLocalizer>> {
    match config.backend {
        LocalizerBackend::Cascade => {
            let cascade = CascadeLocalizer::from_file(&config.model_path).with_context(|| {
                format!("loading face detection model from {}", config.model_path)
            })?;
            Ok(Arc::new(cascade))
        }
        LocalizerBackend::Heuristic => Ok(Arc::new(HeuristicLocalizer::default())),
    }
}
