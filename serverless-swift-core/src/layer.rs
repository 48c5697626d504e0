//! Shared Swift runtime layer coordinates
//!
//! The layer is pre-published by a fixed account and only replicated to a
//! fixed set of regions, so the region is checked at build time.

use crate::constants::{AWS_ACCOUNT_ID, LAMBDA_LAYER_VERSION, LAYER_SUPPORTED_REGIONS};
use crate::error::{ConfigError, Result};

/// Returns the ARN of the Swift runtime layer in `region`
pub fn layer_arn(region: &str) -> String {
    format!(
        "arn:aws:lambda:{}:{}:layer:swift:{}",
        region, AWS_ACCOUNT_ID, LAMBDA_LAYER_VERSION
    )
}

/// Checks whether the runtime layer is published in `region`
pub fn is_region_supported(region: &str) -> bool {
    LAYER_SUPPORTED_REGIONS.contains(&region)
}

/// Fails with [`ConfigError::UnsupportedRegion`] outside the allow-list
pub fn assert_region_supported(region: &str) -> Result<()> {
    if is_region_supported(region) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedRegion(region.to_string()))
    }
}
