//! Churn model serving
//!
//! Loads a trained model artifact from disk and serves predictions behind the
//! `InferenceBackend` trait. The artifact carries the coefficients of a
//! logistic model over the training feature set, with contract type one-hot
//! encoded against a month-to-month baseline.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::inference::{ContractType, CustomerFeatures, InferenceBackend, Prediction};
use crate::domain::DomainError;

// ============================================================================
// ModelArtifact
// ============================================================================

/// Serialized coefficients of a trained churn model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub intercept: f64,
    pub tenure_months: f64,
    pub monthly_charges: f64,
    pub total_charges: f64,
    pub num_support_tickets: f64,
    /// One-hot coefficient for one-year contracts; month-to-month is the
    /// dropped baseline column
    pub contract_one_year: f64,
    /// One-hot coefficient for two-year contracts
    pub contract_two_year: f64,
}

// ============================================================================
// LogisticChurnModel
// ============================================================================

/// Churn model backed by a loaded coefficient artifact
#[derive(Debug, Clone)]
pub struct LogisticChurnModel {
    artifact: ModelArtifact,
}

impl LogisticChurnModel {
    /// Create a model from an in-memory artifact
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Load a model artifact from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read model artifact '{}': {}",
                path.display(),
                e
            ))
        })?;

        let artifact: ModelArtifact = serde_json::from_str(&contents).map_err(|e| {
            DomainError::configuration(format!(
                "Invalid model artifact '{}': {}",
                path.display(),
                e
            ))
        })?;

        info!(path = %path.display(), "Model artifact loaded");
        Ok(Self::new(artifact))
    }

    /// Churn probability for the given features
    fn score(&self, features: &CustomerFeatures) -> f64 {
        let a = &self.artifact;

        let (one_year, two_year) = match features.contract_type {
            ContractType::MonthToMonth => (0.0, 0.0),
            ContractType::OneYear => (1.0, 0.0),
            ContractType::TwoYear => (0.0, 1.0),
        };

        let z = a.intercept
            + a.tenure_months * f64::from(features.tenure_months)
            + a.monthly_charges * features.monthly_charges
            + a.total_charges * features.total_charges
            + a.num_support_tickets * f64::from(features.num_support_tickets)
            + a.contract_one_year * one_year
            + a.contract_two_year * two_year;

        1.0 / (1.0 + (-z).exp())
    }
}

#[async_trait]
impl InferenceBackend for LogisticChurnModel {
    async fn predict(&self, features: &CustomerFeatures) -> Result<Prediction, DomainError> {
        Ok(Prediction::from_probability(self.score(features)))
    }
}
