//! Configuration errors
//!
//! Raised before any container work starts or any descriptor field is touched.

use thiserror::Error;

/// Result type alias for configuration checks
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Problems with the service definition or plugin settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No function resolves to the Swift runtime
    #[error(
        "no Swift functions found. Use 'runtime: {}' in provider or function configuration to use this plugin",
        crate::constants::SWIFT_RUNTIME
    )]
    NoSwiftFunctions,

    /// A function named on the command line is not part of the service
    #[error("function '{0}' doesn't exist in this service")]
    UnknownFunction(String),

    /// The shared runtime layer is not published in this region
    #[error("there is no Swift lambda layer available for the region: {0}")]
    UnsupportedRegion(String),

    /// Attaching the runtime layer would exceed the platform ceiling
    #[error(
        "cannot attach the Swift layer to function '{function}': the maximum of {limit} layers has been reached"
    )]
    TooManyLayers { function: String, limit: usize },

    /// The handler has no executable name before the first '.'
    #[error("function '{function}' has an invalid handler '{handler}'")]
    InvalidHandler { function: String, handler: String },

    /// A plugin setting failed validation
    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    /// The service definition could not be parsed or rendered
    #[error("invalid service definition: {0}")]
    Manifest(#[from] serde_yaml::Error),
}
