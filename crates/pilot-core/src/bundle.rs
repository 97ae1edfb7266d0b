use crate::error::{PilotError, Result};
use crate::paths;
use std::path::PathBuf;
use walkdir::WalkDir;

/// A read-only tree of packaged assets, addressed by `/`-separated relative paths.
pub trait AssetBundle {
    /// Every file in the bundle, sorted.
    fn files(&self) -> Result<Vec<String>>;
    fn read(&self, rel: &str) -> Result<Vec<u8>>;
}

/// Bundle backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetBundle for DirBundle {
    fn files(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(PilotError::SourceNotFound(self.root.clone()));
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = paths::relative_slash_path(&self.root, entry.path()) {
                out.push(rel);
            }
        }
        out.sort();
        Ok(out)
    }

    fn read(&self, rel: &str) -> Result<Vec<u8>> {
        let path = self.root.join(rel);
        if !path.is_file() {
            return Err(PilotError::AssetNotFound(rel.to_string()));
        }
        Ok(std::fs::read(path)?)
    }
}
