//! Function descriptor

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use crate::constants::BOOTSTRAP;

/// Per-function build options from the function's `swift` block
pub type FunctionBuildOptions = BTreeMap<String, String>;

/// A function entry of the service definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    /// Key of the function under `functions:`; unique within a service
    #[serde(skip)]
    pub name: String,

    /// `<executable>[.<suffix>...]`
    #[serde(default)]
    pub handler: String,

    /// Function-level runtime, falls back to the provider runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Build options for this function, e.g. `dockerTag`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift: Option<FunctionBuildOptions>,

    /// Layer references, either ARNs or CloudFormation intrinsics
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageSpec>,

    #[serde(flatten)]
    pub extra: Mapping,
}

/// Packaging instructions for one function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Prebuilt archive to deploy instead of letting the host zip the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,

    /// Extra paths, relative to the service root, shipped next to `bootstrap`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub individually: bool,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl Function {
    /// Creates a function with the given name and handler
    pub fn new(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
            ..Default::default()
        }
    }

    /// Sets the function-level runtime
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// Runtime after falling back to the provider default
    pub fn effective_runtime<'a>(&'a self, provider_runtime: Option<&'a str>) -> Option<&'a str> {
        self.runtime.as_deref().or(provider_runtime)
    }

    /// Image tag requested by the function's `swift.dockerTag`
    pub fn docker_tag_override(&self) -> Option<&str> {
        self.swift
            .as_ref()
            .and_then(|opts| opts.get("dockerTag"))
            .map(String::as_str)
    }

    /// Returns the package block, creating an empty one if absent
    pub fn package_mut(&mut self) -> &mut PackageSpec {
        self.package.get_or_insert_with(PackageSpec::default)
    }

    /// Paths listed under `package.include`
    pub fn include_paths(&self) -> &[String] {
        self.package
            .as_ref()
            .map(|p| p.include.as_slice())
            .unwrap_or_default()
    }
}

/// A handler split into the executable name and trailing segments
///
/// `Run.handler` names the executable `Run`; once the executable is shipped
/// as `bootstrap` the handler becomes `bootstrap.handler`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub binary: String,
    pub suffix: Vec<String>,
}

impl Handler {
    /// Splits a handler on `.`
    ///
    /// Returns `None` when there is no executable name before the first `.`.
    pub fn parse(handler: &str) -> Option<Self> {
        let mut segments = handler.split('.');
        let binary = segments.next().filter(|s| !s.is_empty())?;

        Some(Self {
            binary: binary.to_string(),
            suffix: segments.map(str::to_string).collect(),
        })
    }

    /// Handler pointing at the bootstrap executable, suffix preserved
    pub fn bootstrap_handler(&self) -> String {
        if self.suffix.is_empty() {
            BOOTSTRAP.to_string()
        } else {
            format!("{}.{}", BOOTSTRAP, self.suffix.join("."))
        }
    }
}
