//! Domain layer - Core business logic and entities

pub mod error;
pub mod experiment;
pub mod inference;

pub use error::DomainError;
pub use experiment::{
    ExperimentState, ModelVariant, RoutingStrategy, TrafficError, VariantRegistry, VariantStage,
    VariantSummary,
};
pub use inference::{ContractType, CustomerFeatures, InferenceBackend, Prediction};
