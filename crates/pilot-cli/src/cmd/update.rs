use pilot_core::manifest::AssetManifest;
use pilot_core::update::{MergeStrategy, UpdateOptions, UpdateStatus, Updater};
use pilot_core::upgrade::CommandUpgrader;
use pilot_core::version::RegistryClient;
use std::path::Path;

use crate::embed::EmbeddedBundle;

/// `claude-pilot update`: bring the project's managed files up to date.
pub fn run(
    root: &Path,
    release_url: Option<&str>,
    strategy: MergeStrategy,
    skip_upgrade: bool,
    check_only: bool,
) -> anyhow::Result<()> {
    let cfg = super::load_config(root, release_url)?;
    let releases = RegistryClient::from_config(&cfg.update);
    let upgrader = CommandUpgrader::from_config(&cfg.update);
    let manifest = AssetManifest::curated();

    let opts = UpdateOptions {
        strategy,
        skip_upgrade,
        check_only,
        backup_keep: cfg.update.backup_keep,
    };
    let report = Updater::new(&EmbeddedBundle, &manifest, &releases, &upgrader).run(root, &opts);

    if check_only {
        match report.published.as_deref() {
            Some(p) if report.upgrade_available => {
                println!("Update available: v{} -> v{p}", report.installed);
                println!("  run: {}", upgrader.command_line());
            }
            Some(_) => println!("claude-pilot v{} is the latest release.", report.installed),
            None => println!("claude-pilot v{} (latest release unknown)", report.installed),
        }
        return Ok(());
    }

    if report.upgraded {
        println!("Package upgraded. Re-run `claude-pilot update` to apply the new assets.");
    }

    match report.status {
        UpdateStatus::AlreadyCurrent => {
            println!("Already up to date (v{}).", report.from_version);
        }
        UpdateStatus::Updated => {
            if let Some(sync) = &report.sync {
                let (copied, failed) = sync.counts();
                println!("Updated: {copied} files");
                if failed > 0 {
                    println!("Failed:  {failed} files");
                }
            }
            if let Some(backup) = &report.backup {
                println!("Backup:  {}", backup.display());
            }
            match &report.guide {
                Some(guide) => {
                    println!("Manual merge guide: {}", guide.display());
                    println!();
                    println!("Next steps:");
                    println!("  1. Review the backup and merge guide");
                    println!("  2. Merge the changes");
                    println!(
                        "  3. Stamp the version: echo '{}' > .claude/.pilot-version",
                        report.to_version
                    );
                }
                None => println!(
                    "claude-pilot updated: v{} -> v{}",
                    report.from_version, report.to_version
                ),
            }
        }
        UpdateStatus::Failed => anyhow::bail!("update failed, see messages above"),
    }
    Ok(())
}
