//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod info;

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Where the rewritten service definition goes
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output file (default: .serverless/serverless-swift.yml in the service root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write JSON instead of YAML
    #[arg(long)]
    pub json: bool,

    /// Also write what each hook did as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build every Swift function and attach the runtime layer
    Package {
        /// Only build this function
        #[arg(short, long)]
        function: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Build one function the way `deploy function` does
    DeployFunction {
        /// Function to build
        #[arg(short, long)]
        function: String,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Attach the Swift runtime layer without building
    AttachLayer {
        /// Only attach to this function
        #[arg(short, long)]
        function: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the build image reference
    Image {
        /// Image tag (default: the service's dockerTag)
        tag: Option<String>,
    },
    /// Print the runtime layer ARN for a region
    LayerArn {
        /// Region (default: the service's provider region)
        region: Option<String>,
    },
    /// Check that the container runtime is installed
    Check,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Package { function, output } => build::package(config, function, &output),
        Commands::DeployFunction { function, output } => {
            build::deploy_function(config, function, &output)
        }
        Commands::AttachLayer { function, output } => {
            build::attach_layer(config, function, &output)
        }
        Commands::Image { tag } => info::image(config, tag),
        Commands::LayerArn { region } => info::layer_arn(config, region),
        Commands::Check => info::check(config),
    }
}
