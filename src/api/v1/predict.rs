//! Churn prediction endpoint

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::inference::{ContractType, CustomerFeatures, InferenceBackend};
use crate::infrastructure::observability::{
    record_variant_error, record_variant_latency, record_variant_request, DEFAULT_VARIANT_NAME,
    DEFAULT_VARIANT_VERSION,
};

// ============================================================================
// Request / Response Types
// ============================================================================

/// Request schema for churn prediction
#[derive(Debug, Clone, Deserialize)]
pub struct ChurnPredictionRequest {
    /// Customer tenure in months (0-100)
    pub tenure_months: u32,
    /// Monthly charges in dollars (0-500)
    pub monthly_charges: f64,
    /// Total charges in dollars (0-20000)
    pub total_charges: f64,
    /// Contract type
    pub contract_type: ContractType,
    /// Number of support tickets (0-50)
    pub num_support_tickets: u32,
    /// Stable user identifier for hash-based routing
    #[serde(default)]
    pub user_id: Option<String>,
    /// Session identifier for sticky routing
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response schema for churn prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnPredictionResponse {
    pub request_id: Uuid,
    /// Churn prediction (0=No, 1=Yes)
    pub prediction: u8,
    /// Churn probability, rounded to 3 decimals
    pub probability: f64,
    /// Variant that served the prediction
    pub variant_name: String,
    pub variant_version: String,
}

// ============================================================================
// Handler
// ============================================================================

/// POST /v1/predict
///
/// Selects a variant for the request, runs the prediction against its
/// backend, and emits per-variant request/latency/error metrics. When no
/// variant is selectable the fallback model serves the request under the
/// `default`/`unknown` label pair.
pub async fn predict_churn(
    State(state): State<AppState>,
    Json(request): Json<ChurnPredictionRequest>,
) -> Result<Json<ChurnPredictionResponse>, ApiError> {
    validate_request(&request)?;

    let features = CustomerFeatures {
        tenure_months: request.tenure_months,
        monthly_charges: request.monthly_charges,
        total_charges: request.total_charges,
        contract_type: request.contract_type,
        num_support_tickets: request.num_support_tickets,
    };

    let selected = state.router.select(
        None,
        request.user_id.as_deref(),
        request.session_id.as_deref(),
    );

    let (variant_name, variant_version, backend): (String, String, Arc<dyn InferenceBackend>) =
        match selected {
            Some(variant) => (variant.name, variant.version, variant.backend),
            None => match &state.default_model {
                Some(model) => (
                    DEFAULT_VARIANT_NAME.to_string(),
                    DEFAULT_VARIANT_VERSION.to_string(),
                    Arc::clone(model),
                ),
                None => {
                    return Err(ApiError::unavailable(
                        "Model not loaded. Please train the model first.",
                    ))
                }
            },
        };

    record_variant_request(&variant_name, &variant_version);

    let request_id = Uuid::new_v4();
    let start = Instant::now();

    match backend.predict(&features).await {
        Ok(prediction) => {
            record_variant_latency(&variant_name, &variant_version, start.elapsed());

            debug!(
                request_id = %request_id,
                variant = %variant_name,
                prediction = prediction.label,
                "Prediction served"
            );

            Ok(Json(ChurnPredictionResponse {
                request_id,
                prediction: prediction.label,
                probability: round3(prediction.probability),
                variant_name,
                variant_version,
            }))
        }
        Err(e) => {
            record_variant_error(&variant_name, &variant_version);
            Err(ApiError::from(e))
        }
    }
}

fn validate_request(request: &ChurnPredictionRequest) -> Result<(), ApiError> {
    if request.tenure_months > 100 {
        return Err(
            ApiError::bad_request("tenure_months must be between 0 and 100")
                .with_param("tenure_months"),
        );
    }

    if !(0.0..=500.0).contains(&request.monthly_charges) {
        return Err(
            ApiError::bad_request("monthly_charges must be between 0 and 500")
                .with_param("monthly_charges"),
        );
    }

    if !(0.0..=20000.0).contains(&request.total_charges) {
        return Err(
            ApiError::bad_request("total_charges must be between 0 and 20000")
                .with_param("total_charges"),
        );
    }

    if request.num_support_tickets > 50 {
        return Err(
            ApiError::bad_request("num_support_tickets must be between 0 and 50")
                .with_param("num_support_tickets"),
        );
    }

    Ok(())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
