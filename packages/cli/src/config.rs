use std::collections::HashMap;
use std::path::{Path, PathBuf};

use easel_evaluator::CalcConfig;
use easel_model::ElementId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_NAME: &str = "easel.config.json";

/// Easel configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// App document, relative to the config
    #[serde(default = "default_app_file")]
    pub app_file: String,

    #[serde(default)]
    pub calc: CalcOptions,

    /// Slides/tabs container id → index of the child showing
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub active_children: HashMap<ElementId, usize>,
}

fn default_app_file() -> String {
    "app.json".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcOptions {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    CalcConfig::default().max_depth
}

impl Default for CalcOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl From<&CalcOptions> for CalcConfig {
    fn from(options: &CalcOptions) -> Self {
        CalcConfig {
            max_depth: options.max_depth,
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// `file` when given, otherwise the configured app file under `cwd`
    pub fn app_path(&self, cwd: &Path, file: Option<&Path>) -> PathBuf {
        match file {
            Some(file) => cwd.join(file),
            None => cwd.join(&self.app_file),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_file: default_app_file(),
            calc: CalcOptions::default(),
            active_children: HashMap::new(),
        }
    }
}
