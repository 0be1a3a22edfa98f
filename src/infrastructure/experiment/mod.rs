//! Infrastructure layer for experiment A/B testing
//!
//! Provides the routing engine and the hashing it uses for sticky and
//! hash-based assignment.

mod consistent_hashing;
mod router;

pub use consistent_hashing::ConsistentHasher;
pub use router::{ExperimentRouter, ExperimentStatus, SelectedVariant};
