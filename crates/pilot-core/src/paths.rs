use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CLAUDE_DIR: &str = ".claude";
pub const PILOT_DIR: &str = ".pilot";
pub const BACKUPS_DIR: &str = ".claude-backups";

pub const SETTINGS_FILE: &str = ".claude/settings.json";
pub const VERSION_FILE: &str = ".claude/.pilot-version";
pub const CONFIG_FILE: &str = ".claude/pilot.yaml";
pub const MCP_FILE: &str = ".mcp.json";
pub const GITIGNORE_FILE: &str = ".gitignore";

pub const MANUAL_MERGE_GUIDE: &str = "MANUAL_MERGE_GUIDE.md";

/// Line that keeps runtime plan state out of git.
pub const PILOT_GITIGNORE_ENTRY: &str = ".pilot/";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn claude_dir(root: &Path) -> PathBuf {
    root.join(CLAUDE_DIR)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

pub fn version_path(root: &Path) -> PathBuf {
    root.join(VERSION_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn backups_dir(root: &Path) -> PathBuf {
    root.join(BACKUPS_DIR)
}

pub fn manual_merge_guide_path(root: &Path) -> PathBuf {
    backups_dir(root).join(MANUAL_MERGE_GUIDE)
}

pub fn mcp_path(root: &Path) -> PathBuf {
    root.join(MCP_FILE)
}

/// Render a path relative to `base` with `/` separators, the form every
/// manifest pattern and catalog entry is written in.
pub fn relative_slash_path(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
