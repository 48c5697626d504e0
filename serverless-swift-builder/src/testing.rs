//! Scripted command runner for tests
//!
//! Records every invocation and, when given a service root, fakes what the
//! real tools would leave on disk: executables after a compile and an archive
//! after a package run.

use serverless_swift_core::constants::ARCHIVE_NAME;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::CONTAINER_SOURCE_DIR;
use crate::process::{BuildOutcome, CommandRunner, Invocation};

#[derive(Default)]
pub struct ScriptedRunner {
    calls: RefCell<Vec<Invocation>>,
    failures: Vec<(String, i32)>,
    unlaunchable: Vec<String>,
    source_root: Option<PathBuf>,
    binaries: Vec<String>,
    skip_archive: bool,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `code` when the program or any argument equals `needle`
    pub fn fail_on(mut self, needle: &str, code: i32) -> Self {
        self.failures.push((needle.to_string(), code));
        self
    }

    /// Fail to spawn `program`
    pub fn unlaunchable(mut self, program: &str) -> Self {
        self.unlaunchable.push(program.to_string());
        self
    }

    /// Write `binaries` on compile and `lambda.zip` on package under `root`
    pub fn producing(mut self, root: impl Into<PathBuf>, binaries: &[&str]) -> Self {
        self.source_root = Some(root.into());
        self.binaries = binaries.iter().map(|b| b.to_string()).collect();
        self
    }

    /// Let the package phase succeed without writing an archive
    pub fn without_archive(mut self) -> Self {
        self.skip_archive = true;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    fn simulate(&self, invocation: &Invocation) -> io::Result<()> {
        let Some(root) = &self.source_root else {
            return Ok(());
        };
        let args = &invocation.args;

        if args.iter().any(|a| a == "swift") && args.iter().any(|a| a == "build") {
            let build_path = value_after(args, "--build-path").unwrap_or(".build");
            let release = root.join(build_path).join("release");
            fs::create_dir_all(&release)?;
            for binary in &self.binaries {
                fs::write(release.join(binary), format!("binary:{}", binary))?;
            }
        }

        if args.iter().any(|a| a == "zip") && !self.skip_archive {
            let workdir = value_after(args, "-w").unwrap_or(CONTAINER_SOURCE_DIR);
            let relative = workdir
                .strip_prefix(CONTAINER_SOURCE_DIR)
                .unwrap_or(workdir)
                .trim_start_matches('/');
            let dir = root.join(relative);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(ARCHIVE_NAME), b"PK")?;
        }

        Ok(())
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<BuildOutcome> {
        self.calls.borrow_mut().push(invocation.clone());

        if self.unlaunchable.contains(&invocation.program) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", invocation.program),
            ));
        }

        for (needle, code) in &self.failures {
            if &invocation.program == needle || invocation.args.iter().any(|a| a == needle) {
                return Ok(BuildOutcome::exited(*code));
            }
        }

        self.simulate(invocation)?;
        Ok(BuildOutcome::exited(0))
    }
}
