//! serverless-swift CLI
//!
//! Stands in for the deployment framework: loads `serverless.yml`, fires the
//! plugin's hooks in lifecycle order and writes the rewritten service
//! definition for the deploy step to pick up.

mod commands;
mod config;
mod manifest;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "serverless-swift")]
#[command(about = "Build and package Swift functions for serverless deployments", long_about = None)]
struct Cli {
    /// Service root containing Package.swift and serverless.yml
    #[arg(long, env = "SERVERLESS_SWIFT_SERVICE_DIR", default_value = ".")]
    service_dir: PathBuf,

    /// Service definition, relative to the service root
    #[arg(long, env = "SERVERLESS_SWIFT_CONFIG", default_value = "serverless.yml")]
    config: PathBuf,

    /// Container runtime executable
    #[arg(long, env = "SERVERLESS_SWIFT_DOCKER", default_value = "docker")]
    docker_bin: String,

    /// Override the provider region
    #[arg(short, long, env = "SERVERLESS_SWIFT_REGION")]
    region: Option<String>,

    /// Override the provider stage
    #[arg(short, long, env = "SERVERLESS_SWIFT_STAGE")]
    stage: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Log filter used when `RUST_LOG` is unset; the prefix covers every workspace crate
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "serverless_swift=debug"
    } else {
        "serverless_swift=info"
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so container output keeps stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::resolve(
        cli.service_dir,
        cli.config,
        cli.docker_bin,
        cli.region,
        cli.stage,
    )?;

    handle_command(cli.command, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_filter_covers_workspace() {
        assert_eq!(default_filter(false), "serverless_swift=info");
        assert_eq!(default_filter(true), "serverless_swift=debug");
        assert!(tracing_subscriber::EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
