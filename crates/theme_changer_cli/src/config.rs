//! CLI configuration file handling (theme-changer.toml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use theme_changer_core::ControllerConfig;
use theme_changer_desktop::WatcherConfig;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "theme-changer.toml";

/// Top-level configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct CliConfig {
    /// Scopes the settings file, like an app bundle/package id
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

fn default_app_id() -> String {
    "theme-changer".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            controller: ControllerConfig::default(),
            watcher: WatcherConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load an explicitly requested config file; it must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load `theme-changer.toml` from `dir` if present, defaults otherwise
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
