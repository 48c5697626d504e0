//! Build configuration
//!
//! Defines every setting the compile and package phases need: the service
//! root to mount, the image tag, SSH forwarding and the folder layout the
//! pipeline reads binaries from and stages archives in.

use serverless_swift_core::ConfigError;
use serverless_swift_core::constants::DEFAULT_DOCKER_TAG;
use serverless_swift_core::domain::SwiftSettings;
use std::path::{Path, PathBuf};

/// Folder under `.build` the compiler writes to
pub const DEFAULT_BUILD_FOLDER: &str = "lambda";

/// Folder under `.serverless` holding per-function staging folders
pub const DEFAULT_PACKAGE_FOLDER: &str = ".serverless-swift";

/// Agent socket Docker Desktop exposes inside containers
pub const DEFAULT_SSH_AUTH_SOCK: &str = "/run/host-services/ssh-auth.sock";

/// Mount point of the service root inside build containers
pub const CONTAINER_SOURCE_DIR: &str = "/src";

/// Build configuration
///
/// Constructed once per pipeline run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Absolute path to the service root (where `Package.swift` lives)
    pub source_path: PathBuf,

    /// Container runtime executable
    pub docker_bin: String,

    /// Default image tag, overridable per function
    pub docker_tag: String,

    /// Mount `$HOME/.ssh` read-only into the compile container
    pub forward_ssh_keys: bool,

    /// Mount the SSH agent socket into the compile container
    pub forward_ssh_agent: bool,

    /// Run `swift package update` before compiling
    pub fetch_dependencies: bool,

    /// Compiler output goes to `.build/<build_folder_name>`, or to
    /// `.build/<build_folder_name>-<tag>` for functions overriding the tag
    pub build_folder_name: String,

    /// Staging goes to `.serverless/<package_folder_name>/<function>`
    pub package_folder_name: String,

    /// Home directory whose `.ssh` is forwarded
    pub home_dir: Option<PathBuf>,

    /// Agent socket path used when forwarding the SSH agent
    pub ssh_auth_sock: String,
}

impl BuildConfig {
    /// Creates a configuration with defaults for the given service root
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            docker_bin: "docker".to_string(),
            docker_tag: DEFAULT_DOCKER_TAG.to_string(),
            forward_ssh_keys: false,
            forward_ssh_agent: false,
            fetch_dependencies: false,
            build_folder_name: DEFAULT_BUILD_FOLDER.to_string(),
            package_folder_name: DEFAULT_PACKAGE_FOLDER.to_string(),
            home_dir: std::env::var_os("HOME").map(PathBuf::from),
            ssh_auth_sock: DEFAULT_SSH_AUTH_SOCK.to_string(),
        }
    }

    /// Creates a configuration from the service's `custom.swift` block
    pub fn from_settings(source_path: impl Into<PathBuf>, settings: &SwiftSettings) -> Self {
        let defaults = Self::new(source_path);
        Self {
            docker_tag: settings.docker_tag().to_string(),
            forward_ssh_keys: settings.forward_ssh_keys(),
            forward_ssh_agent: settings.forward_ssh_agent(),
            fetch_dependencies: settings.fetch_dependencies(),
            build_folder_name: settings
                .build_folder()
                .map(str::to_string)
                .unwrap_or(defaults.build_folder_name.clone()),
            ..defaults
        }
    }

    /// Overrides the container runtime executable
    pub fn with_docker_bin(mut self, docker_bin: impl Into<String>) -> Self {
        self.docker_bin = docker_bin.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source_path.is_absolute() {
            return Err(invalid(
                "sourcePath",
                format!("'{}' is not absolute", self.source_path.display()),
            ));
        }

        if self.docker_bin.trim().is_empty() {
            return Err(invalid("docker", "executable cannot be empty".to_string()));
        }

        if self.docker_tag.trim().is_empty() {
            return Err(invalid("dockerTag", "tag cannot be empty".to_string()));
        }

        check_folder_name("buildFolder", &self.build_folder_name)?;
        check_folder_name("packageFolder", &self.package_folder_name)?;

        Ok(())
    }

    /// Compiler output for the default image, relative to the service root
    pub fn build_path(&self) -> PathBuf {
        Path::new(".build").join(&self.build_folder_name)
    }

    /// Compiler output for one image tag
    ///
    /// Toolchains other than the default one get their own folder so their
    /// build caches never mix.
    pub fn build_path_for(&self, tag: &str) -> PathBuf {
        if tag == self.docker_tag {
            self.build_path()
        } else {
            Path::new(".build").join(format!("{}-{}", self.build_folder_name, tag))
        }
    }

    /// Directory holding release executables on the host
    pub fn release_dir(&self) -> PathBuf {
        self.release_dir_for(&self.docker_tag)
    }

    /// Release executables built with one image tag
    pub fn release_dir_for(&self, tag: &str) -> PathBuf {
        self.source_path.join(self.build_path_for(tag)).join("release")
    }

    /// Staging folder of one function, relative to the service root
    pub fn staging_path(&self, function: &str) -> PathBuf {
        Path::new(".serverless")
            .join(&self.package_folder_name)
            .join(function)
    }

    /// Staging folder of one function on the host
    pub fn staging_dir(&self, function: &str) -> PathBuf {
        self.source_path.join(self.staging_path(function))
    }

    /// Path of a relative service path as seen inside the container
    pub fn container_path(&self, relative: &Path) -> String {
        let mut path = CONTAINER_SOURCE_DIR.to_string();
        for component in relative.components() {
            path.push('/');
            path.push_str(&component.as_os_str().to_string_lossy());
        }
        path
    }
}

fn invalid(key: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidSetting { key, reason }
}

fn check_folder_name(key: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(invalid(
            key,
            format!("'{}' must be a single folder name", name),
        ));
    }
    Ok(())
}
