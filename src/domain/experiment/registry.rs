//! Variant registry: insertion-ordered variant store with weighted lookup
//!
//! The registry knows which variants exist and with what weight; it has no
//! knowledge of selection policy. Iteration order is insertion order, which
//! also fixes the cumulative-weight walk and the rounding fallback.

use std::collections::HashMap;

use super::entity::ModelVariant;
use super::validation::{validate_traffic_share, validate_weight_sum, TrafficError};

/// Insertion-ordered store of variants and their traffic shares
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    variants: Vec<ModelVariant>,
}

impl VariantRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variant, replacing any existing variant with the same name
    ///
    /// A replaced variant keeps its position in iteration order. The new
    /// weight is observed by the next selection; there is no snapshotting.
    pub fn insert(&mut self, variant: ModelVariant) {
        match self.variants.iter_mut().find(|v| v.name() == variant.name()) {
            Some(existing) => *existing = variant,
            None => self.variants.push(variant),
        }
    }

    /// Remove a variant by name; absent names are a no-op
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.variants.len();
        self.variants.retain(|v| v.name() != name);
        self.variants.len() < before
    }

    /// Get a variant by name
    pub fn get(&self, name: &str) -> Option<&ModelVariant> {
        self.variants.iter().find(|v| v.name() == name)
    }

    /// Number of registered variants
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Iterate variants in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ModelVariant> {
        self.variants.iter()
    }

    /// Sum of all traffic shares
    pub fn total_weight(&self) -> f64 {
        self.variants.iter().map(|v| v.traffic_share()).sum()
    }

    /// Atomically apply a new share map
    ///
    /// The incoming map's values (including entries naming unknown variants)
    /// must sum to 100 within tolerance, and each mentioned share must lie in
    /// `[0, 100]`; otherwise nothing changes. Names not present in the
    /// registry are skipped and returned so the caller can warn about them;
    /// registered variants the map does not mention keep their share.
    pub fn update_traffic_shares(
        &mut self,
        shares: &HashMap<String, f64>,
    ) -> Result<Vec<String>, TrafficError> {
        for share in shares.values() {
            validate_traffic_share(*share)?;
        }

        validate_weight_sum(shares.values().sum())?;

        let mut unknown = Vec::new();

        for (name, share) in shares {
            match self.variants.iter_mut().find(|v| v.name() == *name) {
                Some(variant) => variant.set_traffic_share(*share),
                None => unknown.push(name.clone()),
            }
        }

        unknown.sort();
        Ok(unknown)
    }

    /// Resolve a point in weight space to a variant
    ///
    /// Walks variants in insertion order accumulating shares and returns the
    /// first variant whose cumulative share meets or exceeds `point`. If
    /// floating-point accumulation never reaches `point`, the last variant is
    /// returned, so a non-empty registry always resolves. Only an empty
    /// registry yields `None`.
    pub fn variant_for_point(&self, point: f64) -> Option<&ModelVariant> {
        let mut cumulative = 0.0;

        for variant in &self.variants {
            cumulative += variant.traffic_share();

            if cumulative >= point {
                return Some(variant);
            }
        }

        self.variants.last()
    }
}
