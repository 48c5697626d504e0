//! Service definition loading and writing

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use serverless_swift_builder::{Hook, HookReport};
use serverless_swift_core::domain::Service;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;

/// Loads the service definition and applies the region/stage overrides
pub fn load_service(config: &Config) -> Result<Service> {
    let source = std::fs::read_to_string(&config.config_file)
        .with_context(|| format!("Failed to read {}", config.config_file.display()))?;

    let mut service = Service::from_yaml_str(&source)
        .with_context(|| format!("Failed to parse {}", config.config_file.display()))?;

    if let Some(region) = &config.region {
        debug!("Overriding provider region with {}", region);
        service.provider.region = Some(region.clone());
    }
    if let Some(stage) = &config.stage {
        debug!("Overriding provider stage with {}", stage);
        service.provider.stage = Some(stage.clone());
    }

    Ok(service)
}

/// Writes the service definition as YAML, or JSON when `json` is set
pub fn write_service(service: &Service, path: &Path, json: bool) -> Result<()> {
    let rendered = if json {
        serde_json::to_string_pretty(service).context("Failed to render service as JSON")?
    } else {
        service
            .to_yaml_string()
            .context("Failed to render service as YAML")?
    };

    write_file(path, rendered)?;

    info!("Wrote service definition to {}", path.display());
    Ok(())
}

/// Writes what each hook did as a JSON array, in firing order
pub fn write_report(reports: &[(Hook, HookReport)], path: &Path) -> Result<()> {
    let entries = reports
        .iter()
        .map(|(hook, report)| -> serde_json::Result<Value> {
            let mut entry = Map::new();
            entry.insert("hook".to_string(), Value::String(hook.event().to_string()));
            entry.insert("report".to_string(), serde_json::to_value(report)?);
            Ok(Value::Object(entry))
        })
        .collect::<serde_json::Result<Vec<_>>>()
        .context("Failed to render hook report")?;

    let rendered =
        serde_json::to_string_pretty(&entries).context("Failed to render hook report")?;
    write_file(path, rendered)?;

    info!("Wrote hook report to {}", path.display());
    Ok(())
}

fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
