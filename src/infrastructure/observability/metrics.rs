//! Prometheus metrics infrastructure
//!
//! Selection itself emits nothing; the serving layer records one
//! request-started, one completed-with-latency, and at most one failed event
//! per prediction, labeled with the selected variant's identity.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Labels used when a prediction was served without a selected variant
pub const DEFAULT_VARIANT_NAME: &str = "default";
pub const DEFAULT_VARIANT_VERSION: &str = "unknown";

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = PrometheusBuilder::new();

    match builder.install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    // Register default metrics with initial values
    gauge!("churn_gateway_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record that a prediction request started against a variant
pub fn record_variant_request(variant_name: &str, variant_version: &str) {
    counter!("ab_test_requests_total", &variant_labels(variant_name, variant_version))
        .increment(1);
}

/// Record the duration of a completed prediction against a variant
pub fn record_variant_latency(variant_name: &str, variant_version: &str, duration: Duration) {
    histogram!(
        "ab_test_prediction_duration_seconds",
        &variant_labels(variant_name, variant_version)
    )
    .record(duration.as_secs_f64());
}

/// Record a failed prediction against a variant
pub fn record_variant_error(variant_name: &str, variant_version: &str) {
    counter!("ab_test_errors_total", &variant_labels(variant_name, variant_version)).increment(1);
}

fn variant_labels(name: &str, version: &str) -> [(&'static str, String); 2] {
    [
        ("variant_name", name.to_string()),
        ("variant_version", version.to_string()),
    ]
}
