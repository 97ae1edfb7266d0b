use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const PACKAGE_NAME: &str = "claude-pilot";

// ---------------------------------------------------------------------------
// UpdateConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateConfig {
    /// Endpoint returning a JSON document that carries the latest release.
    #[serde(default = "default_release_url")]
    pub release_url: String,
    /// JSON pointer to the version string inside that document.
    #[serde(default = "default_version_pointer")]
    pub version_pointer: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_backup_keep")]
    pub backup_keep: usize,
    /// argv of the package self-upgrade.
    #[serde(default = "default_upgrade_command")]
    pub upgrade_command: Vec<String>,
}

fn default_release_url() -> String {
    format!("https://crates.io/api/v1/crates/{PACKAGE_NAME}")
}

fn default_version_pointer() -> String {
    "/crate/max_version".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_backup_keep() -> usize {
    5
}

fn default_upgrade_command() -> Vec<String> {
    ["cargo", "install", "--locked", "--force", PACKAGE_NAME]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            release_url: default_release_url(),
            version_pointer: default_version_pointer(),
            timeout_secs: default_timeout_secs(),
            backup_keep: default_backup_keep(),
            upgrade_command: default_upgrade_command(),
        }
    }
}

impl UpdateConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// CodexConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodexConfig {
    #[serde(default = "default_codex_enabled")]
    pub enabled: bool,
    #[serde(default = "default_codex_model")]
    pub model: String,
}

fn default_codex_enabled() -> bool {
    true
}

fn default_codex_model() -> String {
    "gpt-5.2".to_string()
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            enabled: default_codex_enabled(),
            model: default_codex_model(),
        }
    }
}

// ---------------------------------------------------------------------------
// PilotConfig
// ---------------------------------------------------------------------------

/// Per-project settings from `.claude/pilot.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PilotConfig {
    #[serde(default)]
    pub update: UpdateConfig,
    #[serde(default)]
    pub codex: CodexConfig,
}

impl PilotConfig {
    /// Load the project config, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }
}
