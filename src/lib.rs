//! Churn Gateway
//!
//! An inference gateway for customer churn prediction with support for:
//! - A/B experiments across concurrently-deployed model versions
//! - Weighted random, hash, and sticky routing strategies
//! - Atomic runtime traffic reconfiguration
//! - Per-variant Prometheus metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use config::{ExperimentsConfig, ModelConfig};
use domain::experiment::parse_traffic_config;
use domain::inference::InferenceBackend;
use domain::ModelVariant;
use infrastructure::experiment::ExperimentRouter;
use infrastructure::inference::LogisticChurnModel;

/// Create the application state from configuration
///
/// Startup configuration flows through the same administrative operations as
/// runtime reconfiguration; there is no separate code path.
pub fn create_app_state(config: &AppConfig) -> AppState {
    let default_model = load_default_model(&config.model);
    let router = Arc::new(ExperimentRouter::new());

    configure_experiments(&router, &config.experiments, default_model.as_ref());

    AppState::new(router, default_model)
}

fn load_default_model(config: &ModelConfig) -> Option<Arc<dyn InferenceBackend>> {
    let path = config.path.as_ref()?;

    match LogisticChurnModel::load(path) {
        Ok(model) => Some(Arc::new(model)),
        Err(e) => {
            warn!(
                "Failed to load model: {}. Predictions are unavailable until a variant is added.",
                e
            );
            None
        }
    }
}

/// Apply the experiment section of the configuration to the router
fn configure_experiments(
    router: &ExperimentRouter,
    config: &ExperimentsConfig,
    default_model: Option<&Arc<dyn InferenceBackend>>,
) {
    for entry in &config.variants {
        let backend: Arc<dyn InferenceBackend> = match &entry.model_path {
            Some(path) => match LogisticChurnModel::load(path) {
                Ok(model) => Arc::new(model),
                Err(e) => {
                    warn!(variant = %entry.name, "Skipping variant: {}", e);
                    continue;
                }
            },
            None => match default_model {
                Some(model) => Arc::clone(model),
                None => {
                    warn!(variant = %entry.name, "Skipping variant: no model available");
                    continue;
                }
            },
        };

        match ModelVariant::new(&entry.name, backend, entry.traffic_share) {
            Ok(variant) => router.add_variant(
                variant
                    .with_version(&entry.version)
                    .with_stage(entry.stage),
            ),
            Err(e) => warn!(variant = %entry.name, "Skipping variant: {}", e),
        }
    }

    router.set_strategy_str(&config.strategy);

    if let Some(ref traffic) = config.traffic {
        match parse_traffic_config(traffic) {
            Ok(shares) => {
                if let Err(e) = router.update_traffic_shares(&shares) {
                    warn!("Ignoring traffic configuration: {}", e);
                }
            }
            Err(e) => warn!("Error parsing traffic configuration: {}", e),
        }
    }

    if config.enabled {
        router.enable(config.experiment_id.as_str());
    } else {
        info!("A/B testing is disabled");
    }
}
