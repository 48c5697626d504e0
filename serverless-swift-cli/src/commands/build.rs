//! Packaging command handlers
//!
//! Each command loads the service, fires the plugin hooks the matching host
//! lifecycle would fire, and writes the rewritten service definition. Nothing
//! is written when a hook fails.

use anyhow::{Context, Result};
use colored::*;
use serverless_swift_builder::{
    ArtifactBuilder, BuildConfig, Hook, HookReport, PluginOptions, SwiftPlugin, SystemRunner,
};

use super::OutputArgs;
use crate::config::Config;
use crate::manifest::{load_service, write_report, write_service};

/// `package`: build artifacts, then attach the layer
pub fn package(config: &Config, function: Option<String>, output: &OutputArgs) -> Result<()> {
    run_hooks(
        config,
        function,
        &[Hook::CreateDeploymentArtifacts, Hook::CompileLayers],
        output,
    )
}

/// `deploy-function`: build a single function
pub fn deploy_function(config: &Config, function: String, output: &OutputArgs) -> Result<()> {
    run_hooks(config, Some(function), &[Hook::PackageFunction], output)
}

/// `attach-layer`: layer stage only
pub fn attach_layer(config: &Config, function: Option<String>, output: &OutputArgs) -> Result<()> {
    run_hooks(config, function, &[Hook::CompileLayers], output)
}

fn run_hooks(
    config: &Config,
    function: Option<String>,
    hooks: &[Hook],
    output: &OutputArgs,
) -> Result<()> {
    let mut service = load_service(config)?;

    let build_config =
        BuildConfig::from_settings(&config.service_dir, &service.custom.swift_settings())
            .with_docker_bin(&config.docker_bin);
    build_config
        .validate()
        .context("Invalid build configuration")?;

    let builder = ArtifactBuilder::new(build_config, SystemRunner);
    let options = PluginOptions { function };
    let plugin = SwiftPlugin::new(&service, &options, builder)?;

    let mut reports = Vec::with_capacity(hooks.len());
    for hook in hooks {
        let report = plugin
            .run_hook(*hook, &mut service)
            .with_context(|| format!("{} failed", hook))?;
        print_report(*hook, &report);
        reports.push((*hook, report));
    }

    let path = output
        .output
        .clone()
        .unwrap_or_else(|| config.default_output(output.json));
    write_service(&service, &path, output.json)?;
    if let Some(report) = &output.report {
        write_report(&reports, report)?;
    }

    println!(
        "{} {}",
        "Service definition written to".green(),
        path.display().to_string().bold()
    );
    Ok(())
}

/// Print what a hook did
fn print_report(hook: Hook, report: &HookReport) {
    println!("{} {}", "▸".cyan(), hook.to_string().bold());

    match report {
        HookReport::Built { functions } => {
            for function in functions {
                println!(
                    "    {:<20} {} -> {}",
                    function.name.bold(),
                    function.binary,
                    function.artifact.dimmed()
                );
                if function.included_files > 0 {
                    println!(
                        "    {:<20} {} included file(s)",
                        "",
                        function.included_files
                    );
                }
            }
        }
        HookReport::LayerAttached(attachment) => {
            println!("    Layer: {}", attachment.arn.dimmed());
            for name in &attachment.attached {
                println!("    {:<20} {}", name.bold(), "attached".green());
            }
            for name in &attachment.unchanged {
                println!("    {:<20} {}", name.bold(), "already attached".yellow());
            }
        }
        HookReport::Skipped { reason } => {
            println!("    {} {}", "skipped:".yellow(), reason);
        }
    }
}
