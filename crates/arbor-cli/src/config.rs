//! CLI configuration, loaded from `.arbor/config.yaml`.

use std::path::Path;

use anyhow::{Context, Result};
use arbor_edit::EditorSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArborConfig {
    /// `tracing` filter used unless `--verbose` is given
    pub log_filter: String,

    pub run: RunConfig,

    pub editor: EditorSettings,
}

impl Default for ArborConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            run: RunConfig::default(),
            editor: EditorSettings::default(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Settings for `arbor run`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    #[serde(default = "default_dt")]
    pub dt_seconds: f32,

    /// Stop ticking once the root returns success or failure
    #[serde(default = "default_true")]
    pub stop_on_settle: bool,
}

fn default_ticks() -> u64 {
    10
}
fn default_dt() -> f32 {
    0.1
}
fn default_true() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            dt_seconds: default_dt(),
            stop_on_settle: true,
        }
    }
}

impl ArborConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from a project root (looks for .arbor/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".arbor/config.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }
}
