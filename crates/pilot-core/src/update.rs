//! Update orchestration: release check, optional self-upgrade, then either
//! an automatic merge of the bundled assets or a manual merge guide.

use crate::backup;
use crate::bundle::AssetBundle;
use crate::catalog;
use crate::error::Result;
use crate::manifest::AssetManifest;
use crate::settings;
use crate::sync::{self, SyncReport};
use crate::upgrade::PackageUpgrader;
use crate::version::{self, ReleaseSource, VersionTracker, BUNDLED_VERSION};
use crate::{io, paths};
use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Comment written above the `.pilot/` line in `.gitignore`.
pub const GITIGNORE_COMMENT: &str = "claude-pilot plan tracking (worktree support)";

pub const DEFAULT_BACKUP_KEEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    #[default]
    Auto,
    Manual,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Auto => f.write_str("auto"),
            MergeStrategy::Manual => f.write_str("manual"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(MergeStrategy::Auto),
            "manual" => Ok(MergeStrategy::Manual),
            other => Err(format!("unknown merge strategy '{other}' (expected auto or manual)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    AlreadyCurrent,
    Updated,
    Failed,
}

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub strategy: MergeStrategy,
    pub skip_upgrade: bool,
    pub check_only: bool,
    pub backup_keep: usize,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::Auto,
            skip_upgrade: false,
            check_only: false,
            backup_keep: DEFAULT_BACKUP_KEEP,
        }
    }
}

/// Everything a caller needs to summarise a run.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub status: UpdateStatus,
    pub installed: String,
    /// Newest published release, when the lookup succeeded.
    pub published: Option<String>,
    pub upgrade_available: bool,
    pub upgraded: bool,
    /// Project stamp before the run.
    pub from_version: String,
    /// Version the project was (or would be) moved to.
    pub to_version: String,
    pub backup: Option<PathBuf>,
    pub sync: Option<SyncReport>,
    pub guide: Option<PathBuf>,
}

impl UpdateReport {
    fn new(installed: &str, published: Option<String>) -> Self {
        let upgrade_available = published.as_deref().is_some_and(|p| p != installed);
        Self {
            status: UpdateStatus::AlreadyCurrent,
            installed: installed.to_string(),
            published,
            upgrade_available,
            upgraded: false,
            from_version: version::NO_VERSION.to_string(),
            to_version: installed.to_string(),
            backup: None,
            sync: None,
            guide: None,
        }
    }

    fn failed(mut self) -> Self {
        self.status = UpdateStatus::Failed;
        self
    }
}

// ---------------------------------------------------------------------------
// Updater
// ---------------------------------------------------------------------------

pub struct Updater<'a> {
    bundle: &'a dyn AssetBundle,
    manifest: &'a AssetManifest,
    releases: &'a dyn ReleaseSource,
    upgrader: &'a dyn PackageUpgrader,
    installed: String,
}

impl<'a> Updater<'a> {
    pub fn new(
        bundle: &'a dyn AssetBundle,
        manifest: &'a AssetManifest,
        releases: &'a dyn ReleaseSource,
        upgrader: &'a dyn PackageUpgrader,
    ) -> Self {
        Self {
            bundle,
            manifest,
            releases,
            upgrader,
            installed: BUNDLED_VERSION.to_string(),
        }
    }

    /// Override the version treated as installed (and stamped on success).
    pub fn with_installed_version(mut self, version: impl Into<String>) -> Self {
        self.installed = version.into();
        self
    }

    pub fn run(&self, root: &Path, opts: &UpdateOptions) -> UpdateReport {
        let tracker = VersionTracker::new(self.releases, self.installed.as_str());
        let published = tracker.fetch_latest();

        tracing::info!("installed version: {}", self.installed);
        match &published {
            Some(v) => tracing::info!("published version: {v}"),
            None => tracing::warn!("published version: unknown (lookup failed)"),
        }

        let mut report = UpdateReport::new(&self.installed, published);

        if opts.check_only {
            if let Some(p) = report.published.as_deref().filter(|_| report.upgrade_available) {
                tracing::info!("package update available: v{} -> v{p}", self.installed);
            } else {
                tracing::info!("package is up to date");
            }
            report.from_version = tracker.current(root);
            return report;
        }

        if report.upgrade_available && !opts.skip_upgrade {
            tracing::info!("upgrading package from v{}", self.installed);
            match self.upgrader.upgrade() {
                Ok(()) => {
                    report.upgraded = true;
                    tracing::info!("package upgraded, re-run this command for full effect");
                }
                Err(e) => tracing::warn!("package upgrade failed: {e}"),
            }
        }

        let current = tracker.current(root);
        let latest = report
            .published
            .clone()
            .unwrap_or_else(|| self.installed.clone());
        report.from_version = current.clone();

        if current == latest {
            if !report.upgrade_available || opts.skip_upgrade {
                tracing::info!("already up to date (v{latest})");
            }
            return report;
        }

        tracing::info!("updating managed files from v{current} to v{latest}");
        match opts.strategy {
            MergeStrategy::Auto => self.auto_update(root, opts, report),
            MergeStrategy::Manual => self.manual_update(root, report),
        }
    }

    fn auto_update(
        &self,
        root: &Path,
        opts: &UpdateOptions,
        mut report: UpdateReport,
    ) -> UpdateReport {
        report.backup = snapshot(root);

        tracing::info!("updating managed files");
        match sync::sync_bundle(self.bundle, self.manifest, root) {
            Ok(sync) => {
                let (ok, failed) = sync.counts();
                tracing::info!("updated: {ok} files");
                if failed > 0 {
                    tracing::warn!("failed: {failed} files");
                }
                report.sync = Some(sync);
            }
            Err(e) => {
                tracing::error!("could not read bundled assets: {e}");
                return report.failed();
            }
        }

        if let Err(e) = sync::cleanup_deprecated(root) {
            tracing::warn!("could not remove deprecated files: {e}");
        }

        tracing::info!("applying settings.json updates");
        if let Err(e) = settings::apply_statusline(root) {
            tracing::error!("statusLine merge failed: {e}");
        }
        if let Err(e) = settings::apply_hooks(root) {
            tracing::error!("hooks merge failed: {e}");
        }

        if let Err(e) =
            io::ensure_gitignore_entry(root, paths::PILOT_GITIGNORE_ENTRY, Some(GITIGNORE_COMMENT))
        {
            tracing::warn!("could not update .gitignore: {e}");
        }

        if let Err(e) = backup::prune_backups(root, opts.backup_keep) {
            tracing::warn!("could not prune old backups: {e}");
        }

        if let Err(e) = version::save_version(root, &self.installed) {
            tracing::error!("could not write version stamp: {e}");
            return report.failed();
        }

        report.to_version = self.installed.clone();
        report.status = UpdateStatus::Updated;
        report
    }

    fn manual_update(&self, root: &Path, mut report: UpdateReport) -> UpdateReport {
        report.backup = snapshot(root);
        let snapshot_dir = report
            .backup
            .clone()
            .unwrap_or_else(|| paths::backups_dir(root).join("<timestamp>"));

        match write_manual_merge_guide(root, &self.installed, &snapshot_dir) {
            Ok(guide) => {
                tracing::info!("manual merge guide generated: {}", guide.display());
                report.guide = Some(guide);
            }
            Err(e) => {
                tracing::error!("could not write merge guide: {e}");
                return report.failed();
            }
        }

        report.status = UpdateStatus::Updated;
        report
    }
}

/// Take the pre-update snapshot. A failed snapshot is a warning: the update
/// goes ahead without a safety copy.
fn snapshot(root: &Path) -> Option<PathBuf> {
    match backup::create_backup(root) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!("could not back up .claude, continuing without a snapshot: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Manual merge guide
// ---------------------------------------------------------------------------

/// Write `.claude-backups/MANUAL_MERGE_GUIDE.md` for the given snapshot.
pub fn write_manual_merge_guide(root: &Path, version: &str, snapshot: &Path) -> Result<PathBuf> {
    let path = paths::manual_merge_guide_path(root);
    let snapshot_name = snapshot
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<timestamp>".to_string());
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let content = render_manual_merge_guide(version, &snapshot_name, &generated);
    io::atomic_write(&path, content.as_bytes())?;
    Ok(path)
}

pub fn render_manual_merge_guide(version: &str, snapshot: &str, generated: &str) -> String {
    let backups = paths::BACKUPS_DIR;
    let version_file = paths::VERSION_FILE;
    let mut out = format!(
        "# Manual Merge Guide
Generated: {generated}
Version: {version}

## Overview
This guide walks through merging the claude-pilot v{version} assets into this project by hand.

## Step 1: Review Backup
Your current `.claude/` directory was copied to `{backups}/{snapshot}/`.

## Step 2: Apply and Compare
Apply the new assets, then compare against the snapshot:

```bash
claude-pilot update --strategy auto --skip-upgrade
diff -ru {backups}/{snapshot} .claude
```

### Commands (.claude/commands/)
```bash
diff {backups}/{snapshot}/commands/00_plan.md .claude/commands/00_plan.md
```

### Templates (.claude/templates/)
```bash
diff {backups}/{snapshot}/templates/CONTEXT.md.template .claude/templates/CONTEXT.md.template
```

### Hooks (.claude/scripts/hooks/)
```bash
diff {backups}/{snapshot}/scripts/hooks/typecheck.sh .claude/scripts/hooks/typecheck.sh
```

To keep your own version of a file, copy it back from the snapshot:
```bash
cp {backups}/{snapshot}/commands/00_plan.md .claude/commands/00_plan.md
```

## Step 3: Update Version
If you merged by hand instead of running the automatic update:
```bash
echo \"{version}\" > {version_file}
```

## Rollback
```bash
rm -rf .claude
cp -r {backups}/{snapshot} .claude
```

## Managed Files
The following files are managed by claude-pilot:
"
    );
    for (_, dest) in catalog::MANAGED_FILES {
        out.push_str(&format!("- `{dest}`\n"));
    }
    out.push_str("\n## Preserved Files\nThese files are never overwritten:\n");
    for owned in catalog::USER_FILES {
        out.push_str(&format!("- `{owned}`\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DirBundle;
    use crate::error::PilotError;
    use crate::version::tests::FixedRelease;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    struct StubUpgrader {
        calls: Cell<usize>,
        fail: bool,
    }

    impl StubUpgrader {
        fn ok() -> Self {
            Self { calls: Cell::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: Cell::new(0), fail: true }
        }
    }

    impl PackageUpgrader for StubUpgrader {
        fn upgrade(&self) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(PilotError::UpgradeFailed("exit status 1".into()))
            } else {
                Ok(())
            }
        }
    }

    const BUNDLED_SETTINGS: &str = r#"{
  "statusLine": {"type": "command", "command": "\"$CLAUDE_PROJECT_DIR\"/.claude/scripts/statusline.sh"},
  "hooks": {"Stop": [{"hooks": [{"type": "command", "command": "\"$CLAUDE_PROJECT_DIR\"/.claude/scripts/hooks/check-todos.sh"}]}]}
}"#;

    fn bundle_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in [
            (".claude/commands/00_plan.md", "# Plan v2"),
            (".claude/scripts/hooks/check-todos.sh", "#!/bin/sh\nexit 0\n"),
            (".claude/settings.json", BUNDLED_SETTINGS),
            ("CLAUDE.md.template", "# Project"),
        ] {
            let p = dir.path().join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, content).unwrap();
        }
        dir
    }

    fn run(
        root: &Path,
        published: Option<&'static str>,
        upgrader: &StubUpgrader,
        opts: &UpdateOptions,
    ) -> UpdateReport {
        let bundle_src = bundle_dir();
        let bundle = DirBundle::new(bundle_src.path());
        let manifest = AssetManifest::curated();
        let releases = FixedRelease(published);
        Updater::new(&bundle, &manifest, &releases, upgrader)
            .with_installed_version("2.1.1")
            .run(root, opts)
    }

    #[test]
    fn strategy_parses_and_displays() {
        assert_eq!("auto".parse::<MergeStrategy>().unwrap(), MergeStrategy::Auto);
        assert_eq!("manual".parse::<MergeStrategy>().unwrap(), MergeStrategy::Manual);
        assert!("merge".parse::<MergeStrategy>().is_err());
        assert_eq!(MergeStrategy::Manual.to_string(), "manual");
    }

    #[test]
    fn fresh_project_is_fully_installed() {
        let project = TempDir::new().unwrap();
        let report = run(project.path(), None, &StubUpgrader::ok(), &UpdateOptions::default());

        assert_eq!(report.status, UpdateStatus::Updated);
        assert_eq!(report.from_version, "none");
        assert_eq!(version::current_version(project.path()), "2.1.1");
        assert_eq!(
            fs::read_to_string(project.path().join(".claude/commands/00_plan.md")).unwrap(),
            "# Plan v2"
        );
        assert_eq!(
            fs::read_to_string(project.path().join("CLAUDE.md")).unwrap(),
            "# Project"
        );
        let gitignore = fs::read_to_string(project.path().join(".gitignore")).unwrap();
        assert!(gitignore.lines().any(|l| l == ".pilot/"));
        assert_eq!(report.sync.unwrap().counts(), (4, 0));
    }

    #[test]
    fn existing_settings_are_merged_not_replaced() {
        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join(".claude")).unwrap();
        fs::write(
            project.path().join(".claude/settings.json"),
            r#"{"language":"en","hooks":{"Stop":[{"hooks":[{"type":"command","command":".claude/scripts/hooks/check-todos.sh"}]}]}}"#,
        )
        .unwrap();
        fs::write(project.path().join("CLAUDE.md"), "# Mine").unwrap();

        let report = run(project.path(), None, &StubUpgrader::ok(), &UpdateOptions::default());
        assert_eq!(report.status, UpdateStatus::Updated);

        let doc: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(project.path().join(".claude/settings.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(doc["language"], "en");
        assert_eq!(doc["statusLine"], settings::default_statusline());
        assert_eq!(
            doc["hooks"]["Stop"][0]["hooks"][0]["command"],
            "\"$CLAUDE_PROJECT_DIR\"/.claude/scripts/hooks/check-todos.sh"
        );
        assert_eq!(
            fs::read_to_string(project.path().join("CLAUDE.md")).unwrap(),
            "# Mine"
        );
        // The pre-update tree was snapshotted.
        let snapshot = report.backup.unwrap();
        assert!(snapshot.join("settings.json").exists());
    }

    #[test]
    fn current_project_is_left_alone() {
        let project = TempDir::new().unwrap();
        version::save_version(project.path(), "2.1.1").unwrap();

        let report = run(project.path(), None, &StubUpgrader::ok(), &UpdateOptions::default());
        assert_eq!(report.status, UpdateStatus::AlreadyCurrent);
        assert!(!project.path().join(".claude-backups").exists());
        assert!(!project.path().join(".claude/commands").exists());
    }

    #[test]
    fn check_only_reports_without_mutation() {
        let project = TempDir::new().unwrap();
        let upgrader = StubUpgrader::ok();
        let opts = UpdateOptions {
            check_only: true,
            ..UpdateOptions::default()
        };

        let report = run(project.path(), Some("2.2.0"), &upgrader, &opts);
        assert_eq!(report.status, UpdateStatus::AlreadyCurrent);
        assert!(report.upgrade_available);
        assert_eq!(upgrader.calls.get(), 0);
        assert!(fs::read_dir(project.path()).unwrap().next().is_none());
    }

    #[test]
    fn newer_release_triggers_upgrade_unless_skipped() {
        let project = TempDir::new().unwrap();
        let upgrader = StubUpgrader::ok();
        let report = run(project.path(), Some("2.2.0"), &upgrader, &UpdateOptions::default());
        assert_eq!(upgrader.calls.get(), 1);
        assert!(report.upgraded);
        // Stamp records the version whose assets were applied.
        assert_eq!(version::current_version(project.path()), "2.1.1");

        let skipped = StubUpgrader::ok();
        let opts = UpdateOptions {
            skip_upgrade: true,
            ..UpdateOptions::default()
        };
        let report = run(project.path(), Some("2.2.0"), &skipped, &opts);
        assert_eq!(skipped.calls.get(), 0);
        assert!(!report.upgraded);
    }

    #[test]
    fn failed_upgrade_does_not_abort() {
        let project = TempDir::new().unwrap();
        let upgrader = StubUpgrader::failing();
        let report = run(project.path(), Some("2.2.0"), &upgrader, &UpdateOptions::default());
        assert_eq!(upgrader.calls.get(), 1);
        assert!(!report.upgraded);
        assert_eq!(report.status, UpdateStatus::Updated);
    }

    #[test]
    fn manual_strategy_writes_guide_only() {
        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join(".claude/commands")).unwrap();
        fs::write(project.path().join(".claude/commands/00_plan.md"), "# Plan v1").unwrap();

        let opts = UpdateOptions {
            strategy: MergeStrategy::Manual,
            ..UpdateOptions::default()
        };
        let report = run(project.path(), None, &StubUpgrader::ok(), &opts);

        assert_eq!(report.status, UpdateStatus::Updated);
        let guide = fs::read_to_string(report.guide.unwrap()).unwrap();
        assert!(guide.contains("- `.claude/commands/00_plan.md`"));
        assert!(guide.contains("- `CLAUDE.md`"));
        assert!(guide.contains("Version: 2.1.1"));
        assert_eq!(
            fs::read_to_string(project.path().join(".claude/commands/00_plan.md")).unwrap(),
            "# Plan v1"
        );
        assert_eq!(version::current_version(project.path()), "none");
    }

    #[test]
    fn backup_failure_is_not_fatal() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".claude-backups"), "in the way").unwrap();

        let report = run(project.path(), None, &StubUpgrader::ok(), &UpdateOptions::default());
        assert_eq!(report.status, UpdateStatus::Updated);
        assert!(report.backup.is_none());
        assert!(project.path().join(".claude/commands/00_plan.md").exists());
    }

    #[test]
    fn manual_guide_failure_is_reported() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".claude-backups"), "in the way").unwrap();
        let opts = UpdateOptions {
            strategy: MergeStrategy::Manual,
            ..UpdateOptions::default()
        };

        let report = run(project.path(), None, &StubUpgrader::ok(), &opts);
        assert_eq!(report.status, UpdateStatus::Failed);
        assert!(report.guide.is_none());
    }

    #[test]
    fn old_snapshots_are_pruned() {
        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join(".claude")).unwrap();
        for i in 0..4 {
            fs::create_dir_all(project.path().join(format!(".claude-backups/2020010{i}_000000")))
                .unwrap();
        }
        let opts = UpdateOptions {
            backup_keep: 2,
            ..UpdateOptions::default()
        };
        run(project.path(), None, &StubUpgrader::ok(), &opts);

        let left = fs::read_dir(project.path().join(".claude-backups"))
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().is_dir())
            .count();
        assert_eq!(left, 2);
    }

    #[test]
    fn guide_names_snapshot() {
        let guide = render_manual_merge_guide("2.1.1", "20260101_120000", "2026-01-01 12:00:00");
        assert!(guide.starts_with("# Manual Merge Guide\nGenerated: 2026-01-01 12:00:00\n"));
        assert!(guide.contains("cp -r .claude-backups/20260101_120000 .claude"));
        assert!(guide.contains("echo \"2.1.1\" > .claude/.pilot-version"));
    }
}
