//! Application state for shared services

use std::sync::Arc;

use crate::domain::inference::InferenceBackend;
use crate::infrastructure::experiment::ExperimentRouter;

/// Application state shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Variant router for A/B experiment traffic
    pub router: Arc<ExperimentRouter>,
    /// Fallback model used when no variant is selectable
    pub default_model: Option<Arc<dyn InferenceBackend>>,
}

impl AppState {
    /// Create application state
    pub fn new(
        router: Arc<ExperimentRouter>,
        default_model: Option<Arc<dyn InferenceBackend>>,
    ) -> Self {
        Self {
            router,
            default_model,
        }
    }

    /// Check whether a fallback model is available
    pub fn model_loaded(&self) -> bool {
        self.default_model.is_some()
    }
}
