use crate::error::Result;
use crate::paths;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Atomically write `data` to `path` using a tempfile in the same directory.
///
/// The result is a regular 0644 file on unix, not the tempfile's private 0600.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(FILE_MODE))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Copy a single file, creating parent directories and carrying over the
/// source modification time. Permissions come along with `fs::copy`.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)?;
    let modified = fs::metadata(src)?.modified()?;
    File::options().write(true).open(dest)?.set_modified(modified)?;
    Ok(())
}

/// Turn on owner/group/other execute bits. No-op off unix.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

pub fn is_shell_script(path: &str) -> bool {
    path.ends_with(".sh")
}

/// Recursively copy `src` into `dest`, returning the number of files copied.
/// An existing `dest` is merged into (same-named files are overwritten).
pub fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut count = 0;
    fs::create_dir_all(dest)?;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Add `entry` to `root/.gitignore` if it isn't already present.
///
/// Checks for an exact line match. Appends with a leading newline separator
/// if the file doesn't already end with one; `comment` goes on the line above
/// the entry. Returns true when the file was changed.
pub fn ensure_gitignore_entry(root: &Path, entry: &str, comment: Option<&str>) -> Result<bool> {
    let gitignore = root.join(paths::GITIGNORE_FILE);
    let existing = if gitignore.exists() {
        fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };
    // Whole-line comparison, not substring.
    if existing.lines().any(|l| l.trim_end() == entry) {
        return Ok(false);
    }
    let sep = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    let mut f = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&gitignore)?;
    match comment {
        Some(c) if existing.is_empty() => writeln!(f, "# {c}\n{entry}")?,
        Some(c) => writeln!(f, "{sep}\n# {c}\n{entry}")?,
        None => writeln!(f, "{sep}{entry}")?,
    }
    Ok(true)
}
