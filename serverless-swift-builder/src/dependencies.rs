//! Swift package dependency resolution
//!
//! Runs `swift package update` on the host against the same build directory
//! the compile phase uses, so the container build starts from resolved sources.

use std::path::PathBuf;
use tracing::info;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::process::{BuildOutcome, CommandRunner, Invocation, run_checked};

/// Swift toolchain executable on the host
const SWIFT_BIN: &str = "swift";

/// Fetches package dependencies for one service
#[derive(Debug, Clone)]
pub struct DependencyFetcher {
    source_path: PathBuf,
    build_path: PathBuf,
}

impl DependencyFetcher {
    /// Creates a fetcher for the build folder of image `tag`
    pub fn new(config: &BuildConfig, tag: &str) -> Self {
        Self {
            source_path: config.source_path.clone(),
            build_path: config.source_path.join(config.build_path_for(tag)),
        }
    }

    /// Command line used to update dependencies
    pub fn invocation(&self) -> Invocation {
        Invocation::new(SWIFT_BIN)
            .args(["package", "--build-path"])
            .arg(self.build_path.to_string_lossy())
            .arg("update")
            .current_dir(&self.source_path)
    }

    /// Updates dependencies, failing on launch errors and non-zero exits
    pub fn fetch<R: CommandRunner + ?Sized>(&self, runner: &R) -> Result<BuildOutcome> {
        info!("Fetching Swift package dependencies");
        run_checked(runner, &self.invocation())
    }
}
