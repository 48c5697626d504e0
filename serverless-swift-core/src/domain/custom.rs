//! Plugin settings under `custom.swift`

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::collections::BTreeMap;

use crate::constants::DEFAULT_DOCKER_TAG;

/// The service's `custom` block
///
/// Only the `swift` key belongs to this plugin; other plugins' settings are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift: Option<SwiftSettings>,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl CustomSection {
    pub fn is_empty(&self) -> bool {
        self.swift.is_none() && self.extra.is_empty()
    }

    /// Settings with every absent key at its default
    pub fn swift_settings(&self) -> SwiftSettings {
        self.swift.clone().unwrap_or_default()
    }
}

/// `custom.swift`
///
/// All keys are optional. Absent keys stay absent when the service is
/// written back; the accessors apply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_tag: Option<String>,

    /// Mount `~/.ssh` read-only so private packages can be resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_ssh_keys: Option<bool>,

    /// Mount the host SSH agent socket into the build container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_ssh_agent: Option<bool>,

    /// Run `swift package update` before each compile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_dependencies: Option<bool>,

    /// Attach the shared runtime layer during layer compilation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_layer: Option<bool>,

    /// Folder under `.build` the compiler writes to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerSettings>,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl SwiftSettings {
    pub fn docker_tag(&self) -> &str {
        self.docker_tag.as_deref().unwrap_or(DEFAULT_DOCKER_TAG)
    }

    pub fn forward_ssh_keys(&self) -> bool {
        self.forward_ssh_keys.unwrap_or(false)
    }

    pub fn forward_ssh_agent(&self) -> bool {
        self.forward_ssh_agent.unwrap_or(false)
    }

    pub fn fetch_dependencies(&self) -> bool {
        self.fetch_dependencies.unwrap_or(false)
    }

    pub fn attach_layer(&self) -> bool {
        self.attach_layer.unwrap_or(true)
    }

    pub fn build_folder(&self) -> Option<&str> {
        self.build_folder.as_deref()
    }
}

/// `custom.swift.layer`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSettings {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}
