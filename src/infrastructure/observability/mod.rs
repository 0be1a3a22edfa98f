//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_variant_error, record_variant_latency,
    record_variant_request, PrometheusMetrics, DEFAULT_VARIANT_NAME, DEFAULT_VARIANT_VERSION,
};
