//! serverless-swift builder
//!
//! Builds Swift functions inside a container and wires the resulting
//! archives into the service definition.
//!
//! Architecture:
//! - Configuration: immutable build settings resolved once per run
//! - Process: blocking subprocess execution with inherited streams
//! - Docker: compile and package phases run in the Swift build image
//! - Staging: per-function folders holding exactly what gets zipped
//! - Pipeline: function selection, per-function build and descriptor updates
//! - Plugin: binds pipeline stages to the host's lifecycle hooks
//!
//! Everything runs on the caller's thread, one subprocess at a time. The first
//! failure aborts the whole stage.

pub mod config;
pub mod dependencies;
pub mod docker;
pub mod error;
pub mod pipeline;
pub mod plugin;
pub mod process;
pub mod staging;

#[cfg(test)]
pub(crate) mod testing;

pub use config::BuildConfig;
pub use docker::ArtifactBuilder;
pub use error::{BuildError, Result};
pub use plugin::{Hook, HookReport, PluginOptions, SwiftPlugin};
pub use process::{BuildOutcome, CommandRunner, Invocation, SystemRunner};
