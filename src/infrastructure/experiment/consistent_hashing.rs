//! Consistent hashing for variant assignment
//!
//! Ensures the same routing key always lands in the same traffic bucket, so
//! hash and sticky routing stay repeatable while the weight table is
//! unchanged.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Consistent hasher for routing keys
#[derive(Debug, Clone, Copy)]
pub struct ConsistentHasher;

impl ConsistentHasher {
    /// Map a routing key to a traffic bucket in `[1, 100]`
    ///
    /// This ensures that:
    /// - The same key always returns the same bucket
    /// - Buckets are uniformly distributed across 1-100
    /// - Different keys are likely to get different buckets
    pub fn bucket(key: &str) -> u8 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % 100) as u8 + 1
    }
}
