// src/rojo.rs

//! Rojo integration: find the binary, optionally inject the bundled runner
//! module, build the place file.

use crate::config::Build;
use crate::scripts;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build the place described by `build` into `output`.
///
/// `project_dir` is the directory the config file lives in; the project file
/// and inject directory are resolved against it. When `inject_dir` is set,
/// the bundled runner module is written there for the duration of the build
/// so the published place can run tests without vendoring the runner.
pub async fn build_place(project_dir: &Path, build: &Build, output: &Path) -> Result<()> {
    let rojo = find_rojo().context(
        "Could not find rojo on PATH. Install it from https://rojo.space or add it to PATH.",
    )?;

    let project_file = build.project_file.as_ref().expect("config validated");
    let project_path = project_dir.join(project_file);

    let injected = match &build.inject_dir {
        Some(dir) => inject_runner_module(&project_dir.join(dir))?,
        None => None,
    };

    let result = run_rojo_build(&rojo, &project_path, output).await;

    // Clean up before surfacing any build error.
    if let Some(path) = injected {
        if let Err(e) = std::fs::remove_file(&path) {
            debug!("failed to remove injected runner module {:?}: {}", path, e);
        }
    }

    result
}

async fn run_rojo_build(rojo: &Path, project_path: &Path, output: &Path) -> Result<()> {
    info!(project = %project_path.display(), "building place with rojo");

    let status = tokio::process::Command::new(rojo)
        .arg("build")
        .arg(project_path)
        .arg("--output")
        .arg(output)
        .status()
        .await
        .context("Failed to spawn rojo")?;

    if !status.success() {
        bail!("rojo build failed with status {}", status);
    }

    Ok(())
}

/// Write the bundled runner module into `dir` unless one is already there.
///
/// Returns the created path so the caller can remove it after the build. A
/// pre-existing file is left alone and never removed.
fn inject_runner_module(dir: &Path) -> Result<Option<PathBuf>> {
    let target = dir.join(scripts::RUNNER_MODULE_FILE);

    if target.exists() {
        debug!("runner module already present at {:?}", target);
        return Ok(None);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create inject directory {:?}", dir))?;
    std::fs::write(&target, scripts::runner_module())
        .with_context(|| format!("Failed to write runner module {:?}", target))?;

    debug!("injected runner module at {:?}", target);
    Ok(Some(target))
}

/// Locate `rojo` (or `rojo.exe`) by scanning the PATH entries.
fn find_rojo() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;

    for dir in std::env::split_paths(&path_var) {
        for name in ["rojo", "rojo.exe"] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    None
}
