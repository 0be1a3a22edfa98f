//! Health check endpoints for Kubernetes probes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

/// Health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub model_loaded: bool,
    pub active_variants: usize,
}

/// Health check status
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Simple health check - returns 200 if the service is running
/// Used for basic liveness probes
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = build_health_response(&state);
    (StatusCode::OK, Json(response))
}

/// Readiness check - verifies a prediction could actually be served
///
/// The service is ready when at least one routable variant or a fallback
/// model exists; degraded when only the fallback remains.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = build_health_response(&state);

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK, // Still accept requests
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness check - simple check to verify the service is running
/// Used for Kubernetes liveness probes to detect crashes
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let active_variants = state.router.status().variants.len();

    let status = if active_variants > 0 {
        HealthStatus::Healthy
    } else if state.model_loaded() {
        HealthStatus::Degraded
    } else {
        HealthStatus::Unhealthy
    };

    HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: state.model_loaded(),
        active_variants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inference::mock::StaticBackend;
    use crate::domain::ModelVariant;
    use crate::infrastructure::experiment::ExperimentRouter;
    use std::sync::Arc;

    fn state_with_variants(count: usize, with_model: bool) -> AppState {
        let router = Arc::new(ExperimentRouter::new());

        for i in 0..count {
            let backend: Arc<dyn crate::domain::InferenceBackend> =
                Arc::new(StaticBackend::churn(0.5));
            router.add_variant(ModelVariant::new(format!("v{}", i), backend, 0.0).unwrap());
        }

        let default_model: Option<Arc<dyn crate::domain::InferenceBackend>> = if with_model {
            Some(Arc::new(StaticBackend::churn(0.5)))
        } else {
            None
        };

        AppState::new(router, default_model)
    }

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn test_healthy_with_variants() {
        let response = build_health_response(&state_with_variants(2, true));

        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.active_variants, 2);
        assert!(response.model_loaded);
    }

    #[test]
    fn test_degraded_with_only_fallback_model() {
        let response = build_health_response(&state_with_variants(0, true));

        assert_eq!(response.status, HealthStatus::Degraded);
        assert_eq!(response.active_variants, 0);
    }

    #[test]
    fn test_unhealthy_without_model_or_variants() {
        let response = build_health_response(&state_with_variants(0, false));

        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert!(!response.model_loaded);
    }
}
