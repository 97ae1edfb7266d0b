pub mod assets;
pub mod init;
pub mod update;
pub mod version;

use anyhow::Context;
use pilot_core::config::PilotConfig;
use std::path::Path;

/// Load `.claude/pilot.yaml`, applying command-line overrides.
pub fn load_config(root: &Path, release_url: Option<&str>) -> anyhow::Result<PilotConfig> {
    let mut cfg = PilotConfig::load(root).context("failed to load .claude/pilot.yaml")?;
    if let Some(url) = release_url {
        cfg.update.release_url = url.to_string();
    }
    Ok(cfg)
}
