// src/runner.rs

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::execution::{CloudExecution, ConsoleSink, ExecutionOptions};
use crate::rojo;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;
use tracing::info;

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init => init_scaffold(),

        Command::Check { config } => check(config),

        Command::Run { config, place_file } => run_tests(config, place_file).await,
    }
}

/* ---------------- run ---------------- */

async fn run_tests(config_path: PathBuf, place_file: Option<PathBuf>) -> Result<()> {
    let cfg = load_validated(&config_path)?;

    let open_cloud = cfg.open_cloud.as_ref().expect("config validated");
    let api_key_env = open_cloud.api_key_env.as_ref().expect("config validated");
    let universe_id = open_cloud.universe_id.expect("config validated");
    let place_id = open_cloud.place_id.expect("config validated");

    let api_key = std::env::var(api_key_env)
        .with_context(|| format!("Environment variable {} is not set", api_key_env))?;

    let project_dir = config_dir(&config_path);

    // Build output lives in a temp dir that outlives the whole run.
    let build_dir = tempdir().context("Failed to create build directory")?;

    let place_file = match place_file {
        Some(path) => path,
        None => {
            let build = cfg.build.as_ref().expect("config validated");
            let output = build_dir.path().join("place.rbxl");
            rojo::build_place(&project_dir, build, &output).await?;
            output
        }
    };

    let options = ExecutionOptions {
        poll_interval: Duration::from_secs(cfg.execution.poll_interval_secs),
        script_file: cfg
            .execution
            .script_file
            .as_ref()
            .map(|f| project_dir.join(f)),
    };

    let execution = CloudExecution::new(api_key, universe_id, place_id, options);
    let mut sink = ConsoleSink::new();

    let passed = execution.run(&place_file, &mut sink).await;

    if !passed {
        bail!("Test run failed");
    }

    info!("test run passed");
    Ok(())
}

/* ---------------- check ---------------- */

fn check(config_path: PathBuf) -> Result<()> {
    load_validated(&config_path)?;
    eprintln!("OK: {:?} is complete", config_path);
    Ok(())
}

fn load_validated(config_path: &Path) -> Result<Config> {
    let cfg = Config::load(config_path)?;

    let problems = cfg.validate();
    if !problems.is_empty() {
        for p in &problems {
            eprintln!("- {}", p);
        }
        bail!("Configuration at {:?} is incomplete", config_path);
    }

    Ok(cfg)
}

fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/* ---------------- init scaffold ---------------- */

fn init_scaffold() -> Result<()> {
    if !Path::new("rbxexec.yaml").exists() {
        std::fs::write("rbxexec.yaml", default_config_yaml())?;
        eprintln!("Created rbxexec.yaml");
    } else {
        eprintln!("rbxexec.yaml already exists (skipping)");
    }

    Ok(())
}

fn default_config_yaml() -> &'static str {
    r#"
build:
  project_file: default.project.json
  # Directory that receives the bundled test runner module during builds.
  # inject_dir: src/ServerStorage

open_cloud:
  api_key_env: RBXEXEC_API_KEY
  universe_id: 123456
  place_id: 654321

execution:
  poll_interval_secs: 3
  # script_file: my_task.luau
"#
}
