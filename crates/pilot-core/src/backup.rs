use crate::error::Result;
use crate::{io, paths};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Filesystem-safe timestamp that sorts chronologically as a string.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Snapshot `.claude/` into `.claude-backups/<timestamp>/`.
///
/// Returns the snapshot path. When the project has no `.claude/` directory
/// nothing is copied and the would-be path is returned. A snapshot taken in
/// the same second as an earlier one replaces it.
pub fn create_backup(root: &Path) -> Result<PathBuf> {
    let backup_dir = paths::backups_dir(root).join(timestamp());
    let claude_dir = paths::claude_dir(root);

    io::ensure_dir(&paths::backups_dir(root))?;

    if claude_dir.is_dir() {
        if backup_dir.exists() {
            fs::remove_dir_all(&backup_dir)?;
        }
        let files = io::copy_tree(&claude_dir, &backup_dir)?;
        tracing::info!(files, "backup created: {}", dir_name(&backup_dir));
    }

    Ok(backup_dir)
}

/// Delete all but the `keep` most recently modified snapshots.
/// Returns the removed snapshot paths, oldest last.
pub fn prune_backups(root: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let backups_dir = paths::backups_dir(root);
    if !backups_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut snapshots: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&backups_dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.is_dir() {
            snapshots.push((meta.modified()?, entry.path()));
        }
    }
    snapshots.sort_by(|a, b| b.0.cmp(&a.0));

    let mut removed = Vec::new();
    for (_, path) in snapshots.into_iter().skip(keep) {
        fs::remove_dir_all(&path)?;
        removed.push(path);
    }

    if !removed.is_empty() {
        tracing::info!("removed {} old backup(s)", removed.len());
    }
    Ok(removed)
}

/// Copy the settings file to `settings.json.backup.<timestamp>` beside it.
pub fn backup_settings(settings_path: &Path) -> Result<PathBuf> {
    let name = settings_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings.json".to_string());
    let backup_path = settings_path.with_file_name(format!("{name}.backup.{}", timestamp()));
    fs::copy(settings_path, &backup_path)?;
    Ok(backup_path)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn timestamp_shape() {
        let ts = timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn backup_copies_claude_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".claude/commands")).unwrap();
        fs::write(dir.path().join(".claude/commands/00_plan.md"), "# Plan").unwrap();

        let backup = create_backup(dir.path()).unwrap();
        assert!(backup.starts_with(dir.path().join(".claude-backups")));
        assert_eq!(
            fs::read_to_string(backup.join("commands/00_plan.md")).unwrap(),
            "# Plan"
        );
    }

    #[test]
    fn backup_without_claude_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let backup = create_backup(dir.path()).unwrap();
        assert!(!backup.exists());
        assert!(dir.path().join(".claude-backups").is_dir());
    }

    #[test]
    fn prune_keeps_most_recently_modified() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join(".claude-backups");
        let base = SystemTime::now() - Duration::from_secs(3600);

        // Names deliberately disagree with mtimes: ordering is by mtime.
        for i in 0..8u64 {
            let snap = backups.join(format!("2026010{}_000000", 8 - i));
            fs::create_dir_all(&snap).unwrap();
            File::open(&snap)
                .unwrap()
                .set_modified(base + Duration::from_secs(i * 60))
                .unwrap();
        }
        fs::write(backups.join("MANUAL_MERGE_GUIDE.md"), "# guide").unwrap();

        let removed = prune_backups(dir.path(), 5).unwrap();
        assert_eq!(removed.len(), 3);

        let mut left: Vec<String> = fs::read_dir(&backups)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| !n.ends_with(".md"))
            .collect();
        left.sort();
        // i = 3..8 were the newest five.
        assert_eq!(
            left,
            vec![
                "20260101_000000",
                "20260102_000000",
                "20260103_000000",
                "20260104_000000",
                "20260105_000000",
            ]
        );
        assert!(backups.join("MANUAL_MERGE_GUIDE.md").exists());
    }

    #[test]
    fn prune_without_backups_dir() {
        let dir = TempDir::new().unwrap();
        assert!(prune_backups(dir.path(), 5).unwrap().is_empty());
    }

    #[test]
    fn settings_backup_sits_beside_original() {
        let dir = TempDir::new().unwrap();
        let settings = dir.path().join("settings.json");
        fs::write(&settings, r#"{"language":"en"}"#).unwrap();

        let backup = backup_settings(&settings).unwrap();
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("settings.json.backup."));
        assert_eq!(fs::read_to_string(backup).unwrap(), r#"{"language":"en"}"#);
    }
}
