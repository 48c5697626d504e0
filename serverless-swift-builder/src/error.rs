//! Error types for the build pipeline

use serverless_swift_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for build operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that abort a pipeline stage
#[derive(Debug, Error)]
pub enum BuildError {
    /// Service definition or settings rejected before building
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The executable could not be started at all
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The subprocess ran and reported failure
    #[error("'{program}' failed with status: {}", status_label(.status))]
    Failed { program: String, status: Option<i32> },

    /// The compiler did not produce the executable named by the handler
    #[error(
        "expected executable '{expected}' in {}, found: [{}]",
        .dir.display(),
        .found.join(", ")
    )]
    MissingBinary {
        expected: String,
        dir: PathBuf,
        found: Vec<String>,
    },

    /// The package phase exited cleanly but left no archive behind
    #[error("package phase did not produce {}", .0.display())]
    MissingArchive(PathBuf),

    /// A `package.include` entry points outside the service directory or
    /// would overwrite the staged executable
    #[error("include path '{0}' must stay inside the service directory and not replace bootstrap")]
    InvalidInclude(String),

    /// Filesystem operation on a staging path failed
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}
