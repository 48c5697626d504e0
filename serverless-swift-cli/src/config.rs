//! Configuration module
//!
//! Handles CLI configuration: where the service lives and which container
//! runtime to call.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute service root
    pub service_dir: PathBuf,

    /// Absolute path of the service definition
    pub config_file: PathBuf,

    /// Container runtime executable
    pub docker_bin: String,

    /// Region override applied to the loaded service
    pub region: Option<String>,

    /// Stage override applied to the loaded service
    pub stage: Option<String>,
}

impl Config {
    /// Resolves paths against the current directory
    pub fn resolve(
        service_dir: PathBuf,
        config_file: PathBuf,
        docker_bin: String,
        region: Option<String>,
        stage: Option<String>,
    ) -> Result<Self> {
        let service_dir = std::fs::canonicalize(&service_dir).with_context(|| {
            format!("Service directory {} not found", service_dir.display())
        })?;
        let config_file = service_dir.join(config_file);

        Ok(Self {
            service_dir,
            config_file,
            docker_bin,
            region,
            stage,
        })
    }

    /// Default location of the rewritten service definition
    pub fn default_output(&self, json: bool) -> PathBuf {
        let name = if json {
            "serverless-swift.json"
        } else {
            "serverless-swift.yml"
        };
        self.service_dir.join(".serverless").join(name)
    }
}
