//! Informational command handlers

use anyhow::Result;
use colored::*;
use serverless_swift_builder::process::check_docker_available;
use serverless_swift_core::constants::DEFAULT_DOCKER_TAG;
use serverless_swift_core::image::docker_image;
use serverless_swift_core::layer::{assert_region_supported, layer_arn as arn_for};

use crate::config::Config;
use crate::manifest::load_service;

/// Print the image a build would use
pub fn image(config: &Config, tag: Option<String>) -> Result<()> {
    let tag = match tag {
        Some(tag) => tag,
        None if config.config_file.exists() => load_service(config)?
            .custom
            .swift_settings()
            .docker_tag()
            .to_string(),
        None => DEFAULT_DOCKER_TAG.to_string(),
    };

    println!("{}", docker_image(&tag));
    Ok(())
}

/// Print the layer ARN for a region after checking it is published there
pub fn layer_arn(config: &Config, region: Option<String>) -> Result<()> {
    let region = match region {
        Some(region) => region,
        None => load_service(config)?.provider.region().to_string(),
    };

    assert_region_supported(&region)?;
    println!("{}", arn_for(&region));
    Ok(())
}

/// Verify the container runtime answers
pub fn check(config: &Config) -> Result<()> {
    let version = check_docker_available(&config.docker_bin)?;
    println!("{} {}", "✓".green(), version);
    Ok(())
}
