//! Experiment domain entities

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_traffic_share, TrafficError};
use crate::domain::inference::InferenceBackend;

// ============================================================================
// VariantStage
// ============================================================================

/// Deployment stage of a variant
///
/// Informational metadata carried for display and metric labels; routing
/// never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariantStage {
    #[default]
    Control,
    Treatment,
    Champion,
    Challenger,
}

impl fmt::Display for VariantStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => write!(f, "control"),
            Self::Treatment => write!(f, "treatment"),
            Self::Champion => write!(f, "champion"),
            Self::Challenger => write!(f, "challenger"),
        }
    }
}

impl FromStr for VariantStage {
    type Err = UnknownLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "control" => Ok(Self::Control),
            "treatment" => Ok(Self::Treatment),
            "champion" => Ok(Self::Champion),
            "challenger" => Ok(Self::Challenger),
            _ => Err(UnknownLabelError(s.to_string())),
        }
    }
}

// ============================================================================
// RoutingStrategy
// ============================================================================

/// Strategy used to pick a variant per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Weighted random draw over traffic shares
    #[default]
    Random,
    /// Deterministic bucket derived from the user key
    Hash,
    /// Deterministic bucket derived from the session key
    Sticky,
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Hash => write!(f, "hash"),
            Self::Sticky => write!(f, "sticky"),
        }
    }
}

impl FromStr for RoutingStrategy {
    type Err = UnknownLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "hash" => Ok(Self::Hash),
            "sticky" => Ok(Self::Sticky),
            _ => Err(UnknownLabelError(s.to_string())),
        }
    }
}

/// Error for a string that names no known stage or strategy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized label '{0}'")]
pub struct UnknownLabelError(pub String);

// ============================================================================
// ModelVariant
// ============================================================================

/// A named, addressable deployment target eligible for traffic
///
/// The variant references its inference backend, it does not own it; the
/// backend's lifetime is managed by whoever constructed it.
#[derive(Debug, Clone)]
pub struct ModelVariant {
    name: String,
    backend: Arc<dyn InferenceBackend>,
    traffic_share: f64,
    version: String,
    stage: VariantStage,
}

impl ModelVariant {
    /// Create a new variant, rejecting shares outside `[0, 100]`
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn InferenceBackend>,
        traffic_share: f64,
    ) -> Result<Self, TrafficError> {
        validate_traffic_share(traffic_share)?;

        Ok(Self {
            name: name.into(),
            backend,
            traffic_share,
            version: "unknown".to_string(),
            stage: VariantStage::default(),
        })
    }

    /// Set the version label
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the deployment stage
    pub fn with_stage(mut self, stage: VariantStage) -> Self {
        self.stage = stage;
        self
    }

    /// Get the variant name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the inference backend bound to this variant
    pub fn backend(&self) -> &Arc<dyn InferenceBackend> {
        &self.backend
    }

    /// Get the traffic share
    pub fn traffic_share(&self) -> f64 {
        self.traffic_share
    }

    /// Get the version label
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the deployment stage
    pub fn stage(&self) -> VariantStage {
        self.stage
    }

    pub(crate) fn set_traffic_share(&mut self, share: f64) {
        self.traffic_share = share;
    }
}

// ============================================================================
// VariantSummary
// ============================================================================

/// Identity and weight of a variant, as reported by `status()`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantSummary {
    pub name: String,
    pub version: String,
    pub stage: VariantStage,
    pub traffic_share: f64,
}

impl From<&ModelVariant> for VariantSummary {
    fn from(variant: &ModelVariant) -> Self {
        Self {
            name: variant.name().to_string(),
            version: variant.version().to_string(),
            stage: variant.stage(),
            traffic_share: variant.traffic_share(),
        }
    }
}

// ============================================================================
// ExperimentState
// ============================================================================

/// Experiment-level state carried alongside the registry
///
/// The `active` flag is advisory display metadata; selection works the same
/// whether or not an experiment is enabled. Callers that want hard gating
/// check it themselves before routing.
#[derive(Debug, Clone, Default)]
pub struct ExperimentState {
    active: bool,
    experiment_id: Option<String>,
    strategy: RoutingStrategy,
    enabled_at: Option<DateTime<Utc>>,
}

impl ExperimentState {
    /// Create state with the default (random) strategy, inactive
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an experiment is enabled
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Get the enabled experiment's identifier
    pub fn experiment_id(&self) -> Option<&str> {
        self.experiment_id.as_deref()
    }

    /// Get the configured routing strategy
    pub fn strategy(&self) -> RoutingStrategy {
        self.strategy
    }

    /// Get when the experiment was enabled
    pub fn enabled_at(&self) -> Option<DateTime<Utc>> {
        self.enabled_at
    }

    /// Set the routing strategy
    pub fn set_strategy(&mut self, strategy: RoutingStrategy) {
        self.strategy = strategy;
    }

    /// Mark an experiment as enabled under the given identifier
    pub fn enable(&mut self, experiment_id: impl Into<String>) {
        self.active = true;
        self.experiment_id = Some(experiment_id.into());
        self.enabled_at = Some(Utc::now());
    }

    /// Disable the current experiment and clear its identifier
    pub fn disable(&mut self) {
        self.active = false;
        self.experiment_id = None;
        self.enabled_at = None;
    }
}
