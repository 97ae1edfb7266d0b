//! Copies the bundled asset tree into a target project.

use crate::bundle::AssetBundle;
use crate::catalog;
use crate::error::Result;
use crate::io;
use crate::manifest::{AssetManifest, Policy};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Destination paths written.
    pub copied: Vec<String>,
    /// Destination paths left alone because the user owns them.
    pub skipped: Vec<String>,
    /// (destination, error) for each copy that failed.
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    /// (success count, failure count)
    pub fn counts(&self) -> (usize, usize) {
        (self.copied.len(), self.failed.len())
    }
}

enum Action {
    Write,
    Keep,
}

fn decide(manifest: &AssetManifest, bundled: &str, dest_rel: &str, exists: bool) -> Action {
    match manifest.policy(bundled) {
        Some(Policy::Skip) => Action::Keep,
        Some(Policy::Overwrite) => Action::Write,
        Some(Policy::MergeOnly) if exists => Action::Keep,
        Some(Policy::MergeOnly) => Action::Write,
        None if exists && catalog::is_user_owned(dest_rel) => Action::Keep,
        None => Action::Write,
    }
}

/// Write every bundled file into `root`, never overwriting an existing
/// user-owned file. Per-file failures are recorded and processing continues.
pub fn sync_bundle(
    bundle: &dyn AssetBundle,
    manifest: &AssetManifest,
    root: &Path,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    for bundled in bundle.files()? {
        let dest_rel = catalog::destination_for(&bundled);
        let dest = root.join(dest_rel);

        if let Action::Keep = decide(manifest, &bundled, dest_rel, dest.exists()) {
            tracing::debug!(path = dest_rel, "preserving user file");
            report.skipped.push(dest_rel.to_string());
            continue;
        }

        let written = bundle.read(&bundled).and_then(|data| {
            io::atomic_write(&dest, &data)?;
            if io::is_shell_script(dest_rel) {
                io::make_executable(&dest)?;
            }
            Ok(())
        });
        match written {
            Ok(()) => report.copied.push(dest_rel.to_string()),
            Err(e) => {
                tracing::warn!(path = dest_rel, error = %e, "failed to update file");
                report.failed.push((dest_rel.to_string(), e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Remove files retired by earlier releases. Returns the paths removed.
pub fn cleanup_deprecated(root: &Path) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    for (rel, path) in catalog::deprecated_paths(root) {
        if path.is_file() {
            fs::remove_file(&path)?;
            removed.push(rel.to_string());
        }
    }
    if !removed.is_empty() {
        tracing::info!("removed deprecated files: {}", removed.join(", "));
    }
    Ok(removed)
}
