//! Subprocess execution
//!
//! Every external tool (the container runtime, the Swift package manager) is
//! run through [`CommandRunner`]. The system implementation blocks until the
//! child exits and lets it write straight to this process's stdout/stderr.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, error, info};

use crate::error::{BuildError, Result};

/// A command line to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory, None = inherit
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit information of a finished subprocess
///
/// Output is never captured; it went to the inherited streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Exit code, None when terminated by a signal
    pub status: Option<i32>,
}

impl BuildOutcome {
    pub fn exited(code: i32) -> Self {
        Self { status: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs commands to completion
pub trait CommandRunner {
    /// Runs the invocation and waits for it to exit
    ///
    /// # Errors
    /// Returns the spawn error if the program could not be launched.
    fn run(&self, invocation: &Invocation) -> std::io::Result<BuildOutcome>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &Invocation) -> std::io::Result<BuildOutcome> {
        (**self).run(invocation)
    }
}

/// Spawns real processes with inherited stdout/stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<BuildOutcome> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let status = command.status()?;
        Ok(BuildOutcome {
            status: status.code(),
        })
    }
}

/// Runs an invocation and turns launch errors and non-zero exits into [`BuildError`]
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &Invocation,
) -> Result<BuildOutcome> {
    debug!("Running: {}", invocation);

    let outcome = runner.run(invocation).map_err(|e| {
        error!("Failed to launch {}: {}", invocation.program, e);
        BuildError::Launch {
            program: invocation.program.clone(),
            source: e,
        }
    })?;

    if !outcome.success() {
        error!(
            "{} exited unsuccessfully: status={:?}",
            invocation.program, outcome.status
        );
        return Err(BuildError::Failed {
            program: invocation.program.clone(),
            status: outcome.status,
        });
    }

    Ok(outcome)
}

/// Checks that the container runtime is installed and answers `--version`
///
/// # Returns
/// The version line reported by the runtime
pub fn check_docker_available(docker_bin: &str) -> Result<String> {
    let output = Command::new(docker_bin)
        .arg("--version")
        .output()
        .map_err(|e| BuildError::Launch {
            program: docker_bin.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(BuildError::Failed {
            program: docker_bin.to_string(),
            status: output.status.code(),
        });
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    info!("Container runtime is available: {}", version);

    Ok(version)
}
