//! Dockerized Swift builds
//!
//! Handles the two container phases of an artifact build:
//! - Compile: `swift build` in release mode with the service root mounted
//! - Package: `zip` of one function's staging folder
//!
//! Both phases run in the Swift build image, block until the container exits
//! and forward its output live.

use serverless_swift_core::constants::ARCHIVE_NAME;
use serverless_swift_core::domain::FunctionBuildOptions;
use serverless_swift_core::image::docker_image;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{BuildConfig, CONTAINER_SOURCE_DIR};
use crate::error::Result;
use crate::process::{BuildOutcome, CommandRunner, Invocation, run_checked};

/// OS metadata files left out of archives
const ARCHIVE_EXCLUDES: &[&str] = &["*.DS_Store", "__MACOSX/*"];

/// Runs compile and package phases for one service
pub struct ArtifactBuilder<R> {
    config: BuildConfig,
    runner: R,
}

impl<R: CommandRunner> ArtifactBuilder<R> {
    /// Creates a builder
    ///
    /// # Arguments
    /// * `config` - Build configuration for this run
    /// * `runner` - Executes the container runtime
    pub fn new(config: BuildConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Image tag for a function, honouring its `dockerTag` override
    pub fn tag_for<'a>(&'a self, options: Option<&'a FunctionBuildOptions>) -> &'a str {
        options
            .and_then(|opts| opts.get("dockerTag"))
            .map(String::as_str)
            .unwrap_or(&self.config.docker_tag)
    }

    pub fn image_for(&self, options: Option<&FunctionBuildOptions>) -> String {
        docker_image(self.tag_for(options))
    }

    /// Compiles every executable product of the package in release mode
    ///
    /// Executables land in [`BuildConfig::release_dir_for`] of the function's tag.
    pub fn run_compile(&self, options: Option<&FunctionBuildOptions>) -> Result<BuildOutcome> {
        let image = self.image_for(options);
        info!("Compiling Swift package with image {}", image);

        let build_path = self.config.build_path_for(self.tag_for(options));
        let invocation = self
            .docker_run(CONTAINER_SOURCE_DIR, true)
            .arg(image)
            .args(["swift", "build", "-c", "release"])
            .args(["-Xswiftc", "-static-stdlib"])
            .arg("--build-path")
            .arg(build_path.to_string_lossy());

        run_checked(&self.runner, &invocation)
    }

    /// Zips the contents of one staging folder into `lambda.zip` inside it
    ///
    /// # Arguments
    /// * `folder_name` - Staging folder name (the function name)
    /// * `options` - Function build options, for the image override
    pub fn run_package(
        &self,
        folder_name: &str,
        options: Option<&FunctionBuildOptions>,
    ) -> Result<BuildOutcome> {
        let image = self.image_for(options);
        let workdir = self
            .config
            .container_path(&self.config.staging_path(folder_name));
        info!("Packaging {} with image {}", folder_name, image);

        let mut invocation = self
            .docker_run(&workdir, false)
            .arg(image)
            .args(["zip", "-r", ARCHIVE_NAME, "."]);
        for pattern in ARCHIVE_EXCLUDES {
            invocation = invocation.arg("-x").arg(*pattern);
        }

        run_checked(&self.runner, &invocation)
    }

    /// `docker run` prefix with the service root mounted at `/src`
    fn docker_run(&self, workdir: &str, with_ssh: bool) -> Invocation {
        let mut invocation = Invocation::new(&self.config.docker_bin)
            .args(["run", "--rm"])
            .arg("-v")
            .arg(format!(
                "{}:{}",
                self.config.source_path.display(),
                CONTAINER_SOURCE_DIR
            ))
            .arg("-w")
            .arg(workdir);

        if with_ssh {
            invocation = self.ssh_args(invocation);
        }

        invocation
    }

    fn ssh_args(&self, mut invocation: Invocation) -> Invocation {
        if self.config.forward_ssh_keys {
            match &self.config.home_dir {
                Some(home) => {
                    let ssh_dir = Path::new(home).join(".ssh");
                    debug!("Forwarding SSH keys from {}", ssh_dir.display());
                    invocation = invocation
                        .arg("-v")
                        .arg(format!("{}:/root/.ssh:ro", ssh_dir.display()));
                }
                None => {
                    warn!("forwardSshKeys is set but HOME is unknown; skipping");
                }
            }
        }

        if self.config.forward_ssh_agent {
            let sock = &self.config.ssh_auth_sock;
            debug!("Forwarding SSH agent socket {}", sock);
            invocation = invocation
                .arg("-v")
                .arg(format!("{}:{}", sock, sock))
                .arg("-e")
                .arg(format!("SSH_AUTH_SOCK={}", sock));
        }

        invocation
    }
}
