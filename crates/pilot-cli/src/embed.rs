use pilot_core::bundle::AssetBundle;
use pilot_core::{PilotError, Result};
use rust_embed::Embed;

/// Curated asset tree produced by the build script.
#[derive(Embed)]
#[folder = "$PILOT_BUNDLE_DIR"]
struct BundledAssets;

/// The asset bundle compiled into this binary.
pub struct EmbeddedBundle;

impl AssetBundle for EmbeddedBundle {
    fn files(&self) -> Result<Vec<String>> {
        let mut files: Vec<String> = <BundledAssets as Embed>::iter()
            .map(|p| p.into_owned())
            .collect();
        files.sort();
        Ok(files)
    }

    fn read(&self, rel: &str) -> Result<Vec<u8>> {
        <BundledAssets as Embed>::get(rel)
            .map(|f| f.data.into_owned())
            .ok_or_else(|| PilotError::AssetNotFound(rel.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_file_is_readable() {
        let bundle = EmbeddedBundle;
        for rel in bundle.files().unwrap() {
            assert!(bundle.read(&rel).is_ok(), "unreadable: {rel}");
        }
    }

    #[test]
    fn bundle_carries_required_paths() {
        let files = EmbeddedBundle.files().unwrap();
        for required in pilot_core::verify::REQUIRED_PATHS {
            assert!(files.iter().any(|f| f == required), "missing: {required}");
        }
        assert!(files.iter().any(|f| f == "CLAUDE.md.template"));
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert!(matches!(
            EmbeddedBundle.read("no/such/file.md"),
            Err(PilotError::AssetNotFound(_))
        ));
    }
}
