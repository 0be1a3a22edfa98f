//! Inference backend contract and feature types
//!
//! The router treats a backend as an opaque `predict` capability invoked once
//! per accepted request after variant selection. Concrete implementations
//! live in the infrastructure layer.

use std::fmt;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

// ============================================================================
// ContractType
// ============================================================================

/// Customer contract type, one of the three values the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "Month-to-month")]
    MonthToMonth,
    #[serde(rename = "One year")]
    OneYear,
    #[serde(rename = "Two year")]
    TwoYear,
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonthToMonth => write!(f, "Month-to-month"),
            Self::OneYear => write!(f, "One year"),
            Self::TwoYear => write!(f, "Two year"),
        }
    }
}

// ============================================================================
// CustomerFeatures
// ============================================================================

/// Feature vector for a single churn prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFeatures {
    /// Customer tenure in months
    pub tenure_months: u32,
    /// Monthly charges in dollars
    pub monthly_charges: f64,
    /// Total charges in dollars
    pub total_charges: f64,
    /// Contract type
    pub contract_type: ContractType,
    /// Number of support tickets
    pub num_support_tickets: u32,
}

// ============================================================================
// Prediction
// ============================================================================

/// Outcome of a single inference call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Churn label: 0 = retained, 1 = churned
    pub label: u8,
    /// Churn probability in `[0, 1]`
    pub probability: f64,
}

impl Prediction {
    /// Build a prediction from a churn probability, classifying at 0.5
    pub fn from_probability(probability: f64) -> Self {
        Self {
            label: if probability >= 0.5 { 1 } else { 0 },
            probability,
        }
    }

    /// Check whether the customer is predicted to churn
    pub fn is_churn(&self) -> bool {
        self.label == 1
    }
}

// ============================================================================
// InferenceBackend
// ============================================================================

/// Opaque prediction capability bound to a variant
#[async_trait]
pub trait InferenceBackend: Send + Sync + Debug {
    /// Predict churn for the given features
    async fn predict(&self, features: &CustomerFeatures) -> Result<Prediction, DomainError>;
}

#[cfg(test)]
pub mod mock {
    //! Mock backends for testing

    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Backend returning a fixed prediction, counting calls
    #[derive(Debug, Default)]
    pub struct StaticBackend {
        probability: f64,
        should_fail: bool,
        calls: AtomicU64,
    }

    impl StaticBackend {
        /// Backend that always predicts the given churn probability
        pub fn churn(probability: f64) -> Self {
            Self {
                probability,
                should_fail: false,
                calls: AtomicU64::new(0),
            }
        }

        /// Backend whose predict call always fails
        pub fn failing() -> Self {
            Self {
                probability: 0.0,
                should_fail: true,
                calls: AtomicU64::new(0),
            }
        }

        /// Number of predict calls observed
        pub fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceBackend for StaticBackend {
        async fn predict(&self, _features: &CustomerFeatures) -> Result<Prediction, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.should_fail {
                return Err(DomainError::inference("mock backend failure"));
            }

            Ok(Prediction::from_probability(self.probability))
        }
    }

    /// A feature vector usable across tests
    pub fn sample_features() -> CustomerFeatures {
        CustomerFeatures {
            tenure_months: 24,
            monthly_charges: 79.99,
            total_charges: 1919.76,
            contract_type: ContractType::MonthToMonth,
            num_support_tickets: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{sample_features, StaticBackend};
    use super::*;

    #[test]
    fn test_contract_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ContractType::MonthToMonth).unwrap(),
            "\"Month-to-month\""
        );
        assert_eq!(
            serde_json::to_string(&ContractType::OneYear).unwrap(),
            "\"One year\""
        );

        let parsed: ContractType = serde_json::from_str("\"Two year\"").unwrap();
        assert_eq!(parsed, ContractType::TwoYear);
    }

    #[test]
    fn test_contract_type_rejects_unknown_value() {
        let result = serde_json::from_str::<ContractType>("\"Three year\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_prediction_threshold() {
        assert_eq!(Prediction::from_probability(0.73).label, 1);
        assert_eq!(Prediction::from_probability(0.5).label, 1);
        assert_eq!(Prediction::from_probability(0.49).label, 0);
        assert!(Prediction::from_probability(0.9).is_churn());
        assert!(!Prediction::from_probability(0.1).is_churn());
    }

    #[tokio::test]
    async fn test_static_backend_counts_calls() {
        let backend = StaticBackend::churn(0.75);
        let features = sample_features();

        let prediction = backend.predict(&features).await.unwrap();
        backend.predict(&features).await.unwrap();

        assert_eq!(prediction.probability, 0.75);
        assert_eq!(prediction.label, 1);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = StaticBackend::failing();
        let result = backend.predict(&sample_features()).await;

        assert!(result.is_err());
    }
}
