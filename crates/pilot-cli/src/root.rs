use pilot_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the target project directory.
///
/// Priority:
/// 1. `--root` flag / `PILOT_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.claude/` (the home directory's
///    own `.claude/` does not count)
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = home::home_dir();
    find_root(&cwd, home.as_deref())
}

fn find_root(start: &Path, home: Option<&Path>) -> PathBuf {
    let project_marker = start
        .ancestors()
        .filter(|dir| Some(*dir) != home)
        .find(|dir| dir.join(paths::CLAUDE_DIR).is_dir());
    if let Some(dir) = project_marker {
        return dir.to_path_buf();
    }

    if let Some(dir) = start.ancestors().find(|dir| dir.join(".git").is_dir()) {
        return dir.to_path_buf();
    }

    start.to_path_buf()
}
