//! Experiment (A/B Testing) management admin endpoints
//!
//! HTTP form of the router's administrative contract, exposed to
//! configuration tooling rather than end users.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::experiment::{parse_traffic_config, ModelVariant, VariantStage, VariantSummary};
use crate::domain::inference::InferenceBackend;
use crate::infrastructure::experiment::ExperimentStatus;
use crate::infrastructure::inference::LogisticChurnModel;

// ============================================================================
// Request Types
// ============================================================================

/// Request to add or replace a variant
#[derive(Debug, Clone, Deserialize)]
pub struct AddVariantRequest {
    pub name: String,
    pub traffic_share: f64,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub stage: VariantStage,
    /// Path to this variant's model artifact; the fallback model serves the
    /// variant when omitted
    #[serde(default)]
    pub model_path: Option<String>,
}

fn default_version() -> String {
    "unknown".to_string()
}

/// Request to set the routing strategy
#[derive(Debug, Clone, Deserialize)]
pub struct SetStrategyRequest {
    pub strategy: String,
}

/// Request to rebalance traffic
///
/// Either an explicit share map or the compact `name:percentage,...` string
/// form; the map wins when both are present.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateTrafficRequest {
    #[serde(default)]
    pub shares: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub config: Option<String>,
}

/// Request to enable an experiment
#[derive(Debug, Clone, Deserialize)]
pub struct EnableExperimentRequest {
    pub experiment_id: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Response after removing a variant
#[derive(Debug, Clone, Serialize)]
pub struct RemoveVariantResponse {
    pub removed: bool,
}

/// Response after setting the routing strategy
#[derive(Debug, Clone, Serialize)]
pub struct SetStrategyResponse {
    pub strategy: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin/experiments/status
pub async fn get_status(State(state): State<AppState>) -> Json<ExperimentStatus> {
    Json(state.router.status())
}

/// POST /admin/experiments/variants
pub async fn add_variant(
    State(state): State<AppState>,
    Json(request): Json<AddVariantRequest>,
) -> Result<Json<VariantSummary>, ApiError> {
    debug!(variant = %request.name, "Admin adding variant");

    let backend: Arc<dyn InferenceBackend> = match request.model_path {
        Some(ref path) => Arc::new(
            LogisticChurnModel::load(path)
                .map_err(|e| ApiError::bad_request(e.to_string()).with_param("model_path"))?,
        ),
        None => match &state.default_model {
            Some(model) => Arc::clone(model),
            None => {
                return Err(ApiError::bad_request(
                    "No model_path given and no fallback model is loaded",
                )
                .with_param("model_path"))
            }
        },
    };

    let variant = ModelVariant::new(&request.name, backend, request.traffic_share)?
        .with_version(request.version)
        .with_stage(request.stage);

    let summary = VariantSummary::from(&variant);
    state.router.add_variant(variant);

    Ok(Json(summary))
}

/// DELETE /admin/experiments/variants/{name}
pub async fn remove_variant(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<RemoveVariantResponse> {
    debug!(variant = %name, "Admin removing variant");

    Json(RemoveVariantResponse {
        removed: state.router.remove_variant(&name),
    })
}

/// PUT /admin/experiments/strategy
pub async fn set_strategy(
    State(state): State<AppState>,
    Json(request): Json<SetStrategyRequest>,
) -> Json<SetStrategyResponse> {
    let applied = state.router.set_strategy_str(&request.strategy);

    Json(SetStrategyResponse {
        strategy: applied.to_string(),
    })
}

/// PUT /admin/experiments/traffic
pub async fn update_traffic(
    State(state): State<AppState>,
    Json(request): Json<UpdateTrafficRequest>,
) -> Result<Json<ExperimentStatus>, ApiError> {
    let shares = match (request.shares, request.config) {
        (Some(shares), _) => shares,
        (None, Some(config)) => parse_traffic_config(&config)?,
        (None, None) => {
            return Err(ApiError::bad_request(
                "Either 'shares' or a compact 'config' string is required",
            ))
        }
    };

    state.router.update_traffic_shares(&shares)?;

    Ok(Json(state.router.status()))
}

/// POST /admin/experiments/enable
pub async fn enable_experiment(
    State(state): State<AppState>,
    Json(request): Json<EnableExperimentRequest>,
) -> Json<ExperimentStatus> {
    state.router.enable(request.experiment_id);
    Json(state.router.status())
}

/// POST /admin/experiments/disable
pub async fn disable_experiment(State(state): State<AppState>) -> Json<ExperimentStatus> {
    state.router.disable();
    Json(state.router.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inference::mock::StaticBackend;
    use crate::infrastructure::experiment::ExperimentRouter;
    use axum::http::StatusCode;

    fn state() -> AppState {
        let default_model: Arc<dyn InferenceBackend> = Arc::new(StaticBackend::churn(0.5));
        AppState::new(Arc::new(ExperimentRouter::new()), Some(default_model))
    }

    fn add_request(name: &str, share: f64) -> AddVariantRequest {
        AddVariantRequest {
            name: name.to_string(),
            traffic_share: share,
            version: "1.0.0".to_string(),
            stage: VariantStage::Champion,
            model_path: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_remove_variant() {
        let state = state();

        let summary = add_variant(State(state.clone()), Json(add_request("production", 100.0)))
            .await
            .unwrap();

        assert_eq!(summary.0.name, "production");
        assert_eq!(summary.0.stage, VariantStage::Champion);

        let removed = remove_variant(State(state.clone()), Path("production".to_string())).await;
        assert!(removed.0.removed);

        let removed_again = remove_variant(State(state), Path("production".to_string())).await;
        assert!(!removed_again.0.removed);
    }

    #[tokio::test]
    async fn test_add_variant_rejects_invalid_share() {
        let state = state();

        let err = add_variant(State(state), Json(add_request("bad", 150.0)))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_variant_without_any_model_fails() {
        let state = AppState::new(Arc::new(ExperimentRouter::new()), None);

        let err = add_variant(State(state), Json(add_request("production", 100.0)))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("model_path"));
    }

    #[tokio::test]
    async fn test_set_strategy_coerces_unknown_values() {
        let state = state();

        let response = set_strategy(
            State(state.clone()),
            Json(SetStrategyRequest {
                strategy: "sticky".to_string(),
            }),
        )
        .await;
        assert_eq!(response.0.strategy, "sticky");

        let response = set_strategy(
            State(state),
            Json(SetStrategyRequest {
                strategy: "bogus".to_string(),
            }),
        )
        .await;
        assert_eq!(response.0.strategy, "random");
    }

    #[tokio::test]
    async fn test_update_traffic_with_map() {
        let state = state();
        add_variant(State(state.clone()), Json(add_request("production", 70.0)))
            .await
            .unwrap();
        add_variant(State(state.clone()), Json(add_request("staging", 30.0)))
            .await
            .unwrap();

        let request = UpdateTrafficRequest {
            shares: Some(HashMap::from([
                ("production".to_string(), 50.0),
                ("staging".to_string(), 50.0),
            ])),
            config: None,
        };

        let status = update_traffic(State(state), Json(request)).await.unwrap();
        assert_eq!(status.0.variants[0].traffic_share, 50.0);
        assert_eq!(status.0.variants[1].traffic_share, 50.0);
    }

    #[tokio::test]
    async fn test_update_traffic_with_compact_string() {
        let state = state();
        add_variant(State(state.clone()), Json(add_request("production", 100.0)))
            .await
            .unwrap();
        add_variant(State(state.clone()), Json(add_request("staging", 0.0)))
            .await
            .unwrap();

        let request = UpdateTrafficRequest {
            shares: None,
            config: Some("production:90,staging:10".to_string()),
        };

        let status = update_traffic(State(state), Json(request)).await.unwrap();
        assert_eq!(status.0.variants[0].traffic_share, 90.0);
        assert_eq!(status.0.variants[1].traffic_share, 10.0);
    }

    #[tokio::test]
    async fn test_update_traffic_rejects_bad_sum() {
        let state = state();
        add_variant(State(state.clone()), Json(add_request("production", 70.0)))
            .await
            .unwrap();
        add_variant(State(state.clone()), Json(add_request("staging", 30.0)))
            .await
            .unwrap();

        let request = UpdateTrafficRequest {
            shares: None,
            config: Some("production:60,staging:30".to_string()),
        };

        let err = update_traffic(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        // Prior shares retained
        let status = get_status(State(state)).await;
        assert_eq!(status.0.variants[0].traffic_share, 70.0);
        assert_eq!(status.0.variants[1].traffic_share, 30.0);
    }

    #[tokio::test]
    async fn test_update_traffic_requires_input() {
        let state = state();

        let err = update_traffic(State(state), Json(UpdateTrafficRequest::default()))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_enable_and_disable_experiment() {
        let state = state();

        let status = enable_experiment(
            State(state.clone()),
            Json(EnableExperimentRequest {
                experiment_id: "churn-model-v2-rollout".to_string(),
            }),
        )
        .await;

        assert!(status.0.active);
        assert_eq!(
            status.0.experiment_id.as_deref(),
            Some("churn-model-v2-rollout")
        );

        let status = disable_experiment(State(state)).await;
        assert!(!status.0.active);
        assert!(status.0.experiment_id.is_none());
    }
}
