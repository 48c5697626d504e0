//! Per-function staging folders
//!
//! A staging folder holds exactly the files that end up in one function's
//! archive: the compiled executable renamed to `bootstrap` plus any paths
//! listed under `package.include`.

use serverless_swift_core::constants::{ARCHIVE_NAME, BOOTSTRAP};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// Finds the compiled executable named by a handler
///
/// # Errors
/// [`BuildError::MissingBinary`] listing what the compiler did produce.
pub fn locate_binary(release_dir: &Path, name: &str) -> Result<PathBuf> {
    let binary = release_dir.join(name);
    if binary.is_file() {
        return Ok(binary);
    }

    Err(BuildError::MissingBinary {
        expected: name.to_string(),
        dir: release_dir.to_path_buf(),
        found: list_executables(release_dir),
    })
}

/// Release products that look like executables
///
/// SwiftPM leaves objects, modules and build databases next to executables;
/// those all carry an extension.
fn list_executables(release_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(release_dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.contains('.'))
        .collect();
    names.sort();
    names
}

/// Creates the staging folder and drops any archive left by a previous run
pub fn prepare_staging_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;

    let archive = dir.join(ARCHIVE_NAME);
    if archive.exists() {
        debug!("Removing stale archive {}", archive.display());
        fs::remove_file(&archive).map_err(|e| BuildError::io(&archive, e))?;
    }

    Ok(())
}

/// Copies the executable into the staging folder as `bootstrap`
pub fn stage_binary(binary: &Path, staging_dir: &Path) -> Result<PathBuf> {
    let target = staging_dir.join(BOOTSTRAP);
    fs::copy(binary, &target).map_err(|e| BuildError::io(binary, e))?;
    make_executable(&target)?;

    debug!("Staged {} as {}", binary.display(), target.display());
    Ok(target)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .map_err(|e| BuildError::io(path, e))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions).map_err(|e| BuildError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Copies `package.include` paths into the staging folder
///
/// Paths are relative to the service root and keep that relative layout.
/// Directories are copied recursively; the staging folder itself is never
/// walked, so including `.` or `.serverless` does not copy it into itself.
///
/// # Returns
/// Number of files copied
///
/// # Errors
/// [`BuildError::InvalidInclude`] for paths escaping the service root and for
/// files that would replace the staged `bootstrap`.
pub fn stage_includes(
    source_root: &Path,
    includes: &[String],
    staging_dir: &Path,
) -> Result<usize> {
    let mut copied = 0;

    for include in includes {
        let relative = Path::new(include);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(BuildError::InvalidInclude(include.clone()));
        }

        let source = source_root.join(relative);
        let walker = WalkDir::new(&source)
            .into_iter()
            .filter_entry(|entry| !entry.path().starts_with(staging_dir));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&source).to_path_buf();
                BuildError::io(path, e.into())
            })?;

            let Ok(suffix) = entry.path().strip_prefix(source_root) else {
                continue;
            };
            let target = staging_dir.join(suffix);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| BuildError::io(&target, e))?;
            } else {
                if suffix == Path::new(BOOTSTRAP) {
                    return Err(BuildError::InvalidInclude(include.clone()));
                }
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
                }
                fs::copy(entry.path(), &target).map_err(|e| BuildError::io(entry.path(), e))?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}
