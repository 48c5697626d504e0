//! Host lifecycle integration
//!
//! The host framework fires named hooks while packaging a service. The
//! plugin decides which functions it owns when it is constructed, because the
//! build stage rewrites their runtime and later hooks must still find them.

use serde::Serialize;
use serverless_swift_core::domain::Service;
use std::fmt;
use tracing::info;

use crate::docker::ArtifactBuilder;
use crate::error::Result;
use crate::pipeline::{BuiltFunction, LayerAttachment, attach_layer, build_artifacts};
use crate::process::CommandRunner;

/// Lifecycle hooks the plugin handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Before the host zips the service; builds every Swift function
    CreateDeploymentArtifacts,
    /// Before the host compiles layers; attaches the runtime layer
    CompileLayers,
    /// Before a single-function deploy packages that function
    PackageFunction,
}

impl Hook {
    pub const ALL: [Hook; 3] = [
        Hook::CreateDeploymentArtifacts,
        Hook::CompileLayers,
        Hook::PackageFunction,
    ];

    /// Event name the host uses for this hook
    pub fn event(self) -> &'static str {
        match self {
            Hook::CreateDeploymentArtifacts => "before:package:createDeploymentArtifacts",
            Hook::CompileLayers => "before:package:compileLayers",
            Hook::PackageFunction => "before:deploy:function:packageFunction",
        }
    }

    pub fn from_event(event: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hook| hook.event() == event)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event())
    }
}

/// Options the host passes on the command line
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    /// Restrict the run to one function
    pub function: Option<String>,
}

/// What a hook did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookReport {
    Built { functions: Vec<BuiltFunction> },
    LayerAttached(LayerAttachment),
    Skipped { reason: String },
}

/// The Swift plugin bound to one service
pub struct SwiftPlugin<R> {
    builder: ArtifactBuilder<R>,
    swift_functions: Vec<String>,
    attach_layer: bool,
}

impl<R: CommandRunner> SwiftPlugin<R> {
    /// Creates the plugin and resolves the functions it owns
    ///
    /// # Errors
    /// Fails if `options.function` names a function the service doesn't have.
    /// Having no Swift functions is only reported when a hook runs.
    pub fn new(
        service: &Service,
        options: &PluginOptions,
        builder: ArtifactBuilder<R>,
    ) -> Result<Self> {
        let swift_functions = service.swift_functions(options.function.as_deref())?;
        let attach_layer = service.custom.swift_settings().attach_layer();

        info!(
            "Swift plugin loaded for service {}: {} function(s)",
            service.service,
            swift_functions.len()
        );

        Ok(Self {
            builder,
            swift_functions,
            attach_layer,
        })
    }

    /// Hooks this plugin registers
    pub fn hooks(&self) -> &'static [Hook] {
        &Hook::ALL
    }

    pub fn swift_functions(&self) -> &[String] {
        &self.swift_functions
    }

    pub fn builder(&self) -> &ArtifactBuilder<R> {
        &self.builder
    }

    /// Runs the stage bound to `hook`
    pub fn run_hook(&self, hook: Hook, service: &mut Service) -> Result<HookReport> {
        if !service.provider.is_aws() {
            let reason = format!("provider '{}' is not aws", service.provider.name);
            info!("Skipping {}: {}", hook, reason);
            return Ok(HookReport::Skipped { reason });
        }

        info!("Running {}", hook);
        match hook {
            Hook::CreateDeploymentArtifacts | Hook::PackageFunction => {
                let functions = build_artifacts(service, &self.swift_functions, &self.builder)?;
                Ok(HookReport::Built { functions })
            }
            Hook::CompileLayers if !self.attach_layer => Ok(HookReport::Skipped {
                reason: "attachLayer is disabled".to_string(),
            }),
            Hook::CompileLayers => {
                let attachment = attach_layer(service, &self.swift_functions)?;
                Ok(HookReport::LayerAttached(attachment))
            }
        }
    }
}
