// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Root configuration loaded from `rbxexec.yaml`.
///
/// This file controls:
/// - How the place artifact is built (Rojo project, runner injection)
/// - Which Open Cloud universe/place the tests run against
/// - How polling behaves
///
/// Everything is optional at the type level so [`Config::validate`] can list
/// every missing setting in one pass instead of failing on the first.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// How the place artifact gets built.
    #[serde(default)]
    pub build: Option<Build>,

    /// Open Cloud identity: API key variable and target place.
    #[serde(default)]
    pub open_cloud: Option<OpenCloud>,

    /// Remote execution knobs.
    #[serde(default)]
    pub execution: Execution,
}

/// Build section.
///
/// Example in rbxexec.yaml:
///
/// build:
///   project_file: default.project.json
///   inject_dir: src/ServerStorage
#[derive(Debug, Deserialize)]
pub struct Build {
    /// Rojo project file, resolved relative to the config file.
    pub project_file: Option<String>,

    /// Directory (relative to the config file) that receives the bundled
    /// runner module for the duration of the build.
    #[serde(default)]
    pub inject_dir: Option<String>,
}

/// Open Cloud section.
#[derive(Debug, Deserialize)]
pub struct OpenCloud {
    /// Name of the environment variable holding the API key.
    ///
    /// The key itself never lives in the config file.
    pub api_key_env: Option<String>,

    pub universe_id: Option<u64>,

    pub place_id: Option<u64>,
}

/// Execution section. Fully optional; defaults match production behaviour.
#[derive(Debug, Deserialize)]
pub struct Execution {
    /// Seconds between task state reads.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Override for the embedded task script, resolved relative to the
    /// config file.
    #[serde(default)]
    pub script_file: Option<String>,
}

impl Default for Execution {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            script_file: None,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    3
}

impl Config {
    /// Load and parse `rbxexec.yaml` from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let cfg: Config =
            serde_yaml::from_str(&raw).context("Failed to parse YAML config")?;

        Ok(cfg)
    }

    /// List every missing required setting, in a stable order.
    ///
    /// An empty result means the config is runnable. An absent section
    /// produces one message instead of one per field.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match &self.build {
            None => problems.push("build is not configured.".to_string()),
            Some(build) => {
                if build.project_file.is_none() {
                    problems.push("build.project_file is not configured.".to_string());
                }
            }
        }

        match &self.open_cloud {
            None => problems.push("open_cloud is not configured.".to_string()),
            Some(open_cloud) => {
                if open_cloud.api_key_env.is_none() {
                    problems.push("open_cloud.api_key_env is not configured.".to_string());
                }
                if open_cloud.universe_id.is_none() {
                    problems.push("open_cloud.universe_id is not configured.".to_string());
                }
                if open_cloud.place_id.is_none() {
                    problems.push("open_cloud.place_id is not configured.".to_string());
                }
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn complete_config_has_no_problems() {
        let cfg = parse(
            r#"
build:
  project_file: default.project.json
open_cloud:
  api_key_env: RBXEXEC_API_KEY
  universe_id: 123456
  place_id: 654321
"#,
        );

        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn empty_config_reports_missing_sections() {
        let cfg = Config::default();

        assert_eq!(
            cfg.validate(),
            vec![
                "build is not configured.".to_string(),
                "open_cloud is not configured.".to_string(),
            ]
        );
    }

    #[test]
    fn present_sections_report_missing_fields_in_order() {
        let cfg = parse(
            r#"
build: {}
open_cloud: {}
"#,
        );

        assert_eq!(
            cfg.validate(),
            vec![
                "build.project_file is not configured.".to_string(),
                "open_cloud.api_key_env is not configured.".to_string(),
                "open_cloud.universe_id is not configured.".to_string(),
                "open_cloud.place_id is not configured.".to_string(),
            ]
        );
    }

    #[test]
    fn execution_defaults_apply() {
        let cfg = parse(
            r#"
build:
  project_file: default.project.json
"#,
        );

        assert_eq!(cfg.execution.poll_interval_secs, 3);
        assert!(cfg.execution.script_file.is_none());
    }

    #[test]
    fn execution_overrides_parse() {
        let cfg = parse(
            r#"
execution:
  poll_interval_secs: 1
  script_file: my_task.luau
"#,
        );

        assert_eq!(cfg.execution.poll_interval_secs, 1);
        assert_eq!(cfg.execution.script_file.as_deref(), Some("my_task.luau"));
    }
}
