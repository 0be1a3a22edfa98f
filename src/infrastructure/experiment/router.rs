//! Routing engine for A/B experiments
//!
//! Selects exactly one variant per request under the configured strategy and
//! exposes the administrative operations that reconfigure the registry. The
//! registry and experiment state sit behind a single reader-writer lock:
//! selections take the read lock, reconfiguration the write lock, so no
//! selection ever observes a partially-applied weight update.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::experiment::{
    ExperimentState, ModelVariant, RoutingStrategy, TrafficError, VariantRegistry, VariantStage,
    VariantSummary,
};
use crate::domain::inference::InferenceBackend;

// ============================================================================
// SelectedVariant
// ============================================================================

/// Owned snapshot of a selected variant
///
/// Stays valid across later reconfiguration, so the caller can still tag a
/// late error metric with the identity of the variant that served the request.
#[derive(Debug, Clone)]
pub struct SelectedVariant {
    pub name: String,
    pub version: String,
    pub stage: VariantStage,
    pub traffic_share: f64,
    pub backend: Arc<dyn InferenceBackend>,
}

impl From<&ModelVariant> for SelectedVariant {
    fn from(variant: &ModelVariant) -> Self {
        Self {
            name: variant.name().to_string(),
            version: variant.version().to_string(),
            stage: variant.stage(),
            traffic_share: variant.traffic_share(),
            backend: Arc::clone(variant.backend()),
        }
    }
}

// ============================================================================
// ExperimentStatus
// ============================================================================

/// Point-in-time view of the experiment for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentStatus {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
    pub strategy: RoutingStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_at: Option<DateTime<Utc>>,
    pub variants: Vec<VariantSummary>,
}

// ============================================================================
// ExperimentRouter
// ============================================================================

/// Variant router over a shared, concurrently-reconfigured registry
///
/// Explicitly constructed and passed to its callers; configuration loaded at
/// startup goes through the same administrative operations as runtime
/// reconfiguration.
#[derive(Debug, Default)]
pub struct ExperimentRouter {
    inner: RwLock<RouterInner>,
}

#[derive(Debug, Default)]
struct RouterInner {
    registry: VariantRegistry,
    state: ExperimentState,
}

impl ExperimentRouter {
    /// Create an empty router with the default (random) strategy
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select one variant for a request
    ///
    /// Returns `None` only when the registry is empty. Hash routing requires
    /// `user_key` and sticky routing `session_key`; a missing key falls back
    /// to a random draw for that call without touching the configured
    /// strategy. Selection never mutates router state.
    pub fn select(
        &self,
        strategy_override: Option<RoutingStrategy>,
        user_key: Option<&str>,
        session_key: Option<&str>,
    ) -> Option<SelectedVariant> {
        let inner = self.read();
        let strategy = strategy_override.unwrap_or_else(|| inner.state.strategy());

        let selected = match strategy {
            RoutingStrategy::Random => Self::pick_random(&inner.registry),
            RoutingStrategy::Hash => match user_key {
                Some(key) => Self::pick_bucketed(&inner.registry, key),
                None => Self::pick_random(&inner.registry),
            },
            RoutingStrategy::Sticky => match session_key {
                Some(key) => Self::pick_bucketed(&inner.registry, key),
                None => Self::pick_random(&inner.registry),
            },
        };

        if let Some(ref variant) = selected {
            debug!(
                variant = %variant.name,
                version = %variant.version,
                strategy = %strategy,
                "Selected variant"
            );
        }

        selected
    }

    fn pick_random(registry: &VariantRegistry) -> Option<SelectedVariant> {
        let total = registry.total_weight();

        // A zero-weight table has an empty draw range; a point of 0 lands
        // deterministically on the first variant.
        let draw = if total > 0.0 {
            rand::thread_rng().gen_range(0.0..total)
        } else {
            0.0
        };

        registry.variant_for_point(draw).map(SelectedVariant::from)
    }

    fn pick_bucketed(registry: &VariantRegistry, key: &str) -> Option<SelectedVariant> {
        let bucket = super::ConsistentHasher::bucket(key);

        registry
            .variant_for_point(f64::from(bucket))
            .map(SelectedVariant::from)
    }

    // ========================================================================
    // Administrative operations
    // ========================================================================

    /// Insert or replace a variant
    ///
    /// The new weight is observed by the next selection immediately.
    pub fn add_variant(&self, variant: ModelVariant) {
        info!(
            variant = %variant.name(),
            version = %variant.version(),
            stage = %variant.stage(),
            traffic = variant.traffic_share(),
            "Variant added"
        );

        self.write().registry.insert(variant);
    }

    /// Remove a variant by name; absent names are a no-op
    pub fn remove_variant(&self, name: &str) -> bool {
        let removed = self.write().registry.remove(name);

        if removed {
            info!(variant = %name, "Variant removed");
        }

        removed
    }

    /// Set the routing strategy
    pub fn set_strategy(&self, strategy: RoutingStrategy) {
        self.write().state.set_strategy(strategy);
        info!(strategy = %strategy, "Routing strategy set");
    }

    /// Set the routing strategy from a configuration string
    ///
    /// Unrecognized strings fail open to `random` with a warning; a routing
    /// layer prefers availability over correctness of an advisory setting.
    pub fn set_strategy_str(&self, strategy: &str) -> RoutingStrategy {
        let parsed = strategy.parse().unwrap_or_else(|_| {
            warn!(strategy = %strategy, "Unrecognized routing strategy, defaulting to random");
            RoutingStrategy::Random
        });

        self.set_strategy(parsed);
        parsed
    }

    /// Atomically apply a new traffic share map
    ///
    /// All-or-nothing: a map whose values do not sum to 100 (within
    /// tolerance) is rejected and the prior table is retained. Names not in
    /// the registry are logged and skipped, never fatal.
    pub fn update_traffic_shares(
        &self,
        shares: &HashMap<String, f64>,
    ) -> Result<(), TrafficError> {
        let unknown = self.write().registry.update_traffic_shares(shares)?;

        for name in &unknown {
            warn!(variant = %name, "Traffic update references unknown variant");
        }

        info!(updated = shares.len() - unknown.len(), "Traffic shares updated");
        Ok(())
    }

    /// Mark an experiment as enabled under the given identifier
    ///
    /// Advisory: selection behaves identically whether or not an experiment
    /// is active.
    pub fn enable(&self, experiment_id: impl Into<String>) {
        let experiment_id = experiment_id.into();
        info!(experiment_id = %experiment_id, "Experiment enabled");
        self.write().state.enable(experiment_id);
    }

    /// Disable the active experiment and clear its identifier
    pub fn disable(&self) {
        let mut inner = self.write();

        if let Some(id) = inner.state.experiment_id() {
            info!(experiment_id = %id, "Experiment disabled");
        }

        inner.state.disable();
    }

    /// Report current experiment state and variants in insertion order
    pub fn status(&self) -> ExperimentStatus {
        let inner = self.read();

        ExperimentStatus {
            active: inner.state.is_active(),
            experiment_id: inner.state.experiment_id().map(str::to_string),
            strategy: inner.state.strategy(),
            enabled_at: inner.state.enabled_at(),
            variants: inner.registry.iter().map(VariantSummary::from).collect(),
        }
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    // Poisoning is recovered rather than propagated: every mutation validates
    // before touching the table, so a guard recovered from a panicked writer
    // still holds a consistent weight table.
    fn read(&self) -> RwLockReadGuard<'_, RouterInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RouterInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
