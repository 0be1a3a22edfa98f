//! Admin API endpoints for managing gateway resources

pub mod experiments;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // Experiment management
        .route("/experiments/status", get(experiments::get_status))
        .route("/experiments/variants", post(experiments::add_variant))
        .route(
            "/experiments/variants/{name}",
            delete(experiments::remove_variant),
        )
        .route("/experiments/strategy", put(experiments::set_strategy))
        .route("/experiments/traffic", put(experiments::update_traffic))
        .route("/experiments/enable", post(experiments::enable_experiment))
        .route("/experiments/disable", post(experiments::disable_experiment))
}
