//! Traffic share validation and compact traffic-string parsing

use std::collections::HashMap;

use thiserror::Error;

/// Tolerance allowed when checking that updated shares sum to 100
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Upper bound enforced on a single variant's traffic share at admission time
pub const MAX_TRAFFIC_SHARE: f64 = 100.0;

/// Errors raised by traffic configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrafficError {
    #[error("traffic share must be between 0 and 100, got {0}")]
    InvalidWeight(f64),

    #[error("traffic shares must sum to 100, got {0}")]
    WeightSumError(f64),

    #[error("malformed traffic pair '{0}', expected 'name:percentage'")]
    MalformedPair(String),
}

/// Validate a single variant's share at admission time
pub fn validate_traffic_share(share: f64) -> Result<(), TrafficError> {
    if !share.is_finite() || share < 0.0 || share > MAX_TRAFFIC_SHARE {
        return Err(TrafficError::InvalidWeight(share));
    }

    Ok(())
}

/// Validate that a full set of shares sums to 100 within tolerance
pub fn validate_weight_sum(total: f64) -> Result<(), TrafficError> {
    if !total.is_finite() || (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(TrafficError::WeightSumError(total));
    }

    Ok(())
}

/// Parse the compact traffic-string form into a share map
///
/// The format is a comma-separated list of `name:percentage` pairs, e.g.
/// `production:90,staging:10`. Whitespace around names and percentages is
/// ignored.
pub fn parse_traffic_config(config: &str) -> Result<HashMap<String, f64>, TrafficError> {
    let mut shares = HashMap::new();

    for pair in config.split(',') {
        let pair = pair.trim();

        if pair.is_empty() {
            continue;
        }

        let (name, percentage) = pair
            .split_once(':')
            .ok_or_else(|| TrafficError::MalformedPair(pair.to_string()))?;

        let share: f64 = percentage
            .trim()
            .parse()
            .map_err(|_| TrafficError::MalformedPair(pair.to_string()))?;

        shares.insert(name.trim().to_string(), share);
    }

    Ok(shares)
}
