use crate::error::{PilotError, Result};
use crate::io;
use crate::manifest::AssetManifest;
use crate::paths;
use std::path::Path;
use walkdir::WalkDir;

/// Copy every file under `source` that the manifest includes into the
/// mirrored location under `dest`. Returns the number of files copied.
///
/// Per-file copy failures are logged and skipped. Shell scripts always come
/// out executable, whatever the source permissions were.
pub fn generate_assets(source: &Path, dest: &Path, manifest: &AssetManifest) -> Result<usize> {
    if !source.is_dir() {
        return Err(PilotError::SourceNotFound(source.to_path_buf()));
    }

    let mut count = 0;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = paths::relative_slash_path(source, entry.path()) else {
            continue;
        };
        if !manifest.should_include(&rel) {
            continue;
        }

        let target = dest.join(&rel);
        let copied = io::copy_file(entry.path(), &target).and_then(|()| {
            if io::is_shell_script(&rel) {
                io::make_executable(&target)?;
            }
            Ok(())
        });
        match copied {
            Ok(()) => count += 1,
            Err(e) => tracing::warn!(path = %rel, error = %e, "failed to copy asset"),
        }
    }
    Ok(count)
}

/// Packaging entry point: generate the curated bundle for `project_dir` into
/// `assets_dir`, creating it when missing.
pub fn generate_packaged_assets(project_dir: &Path, assets_dir: &Path) -> Result<usize> {
    if !project_dir.exists() {
        return Err(PilotError::SourceNotFound(project_dir.to_path_buf()));
    }
    io::ensure_dir(assets_dir)?;
    generate_assets(project_dir, assets_dir, &AssetManifest::curated())
}
