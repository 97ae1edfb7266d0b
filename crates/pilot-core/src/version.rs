use crate::config::{UpdateConfig, PACKAGE_NAME};
use crate::error::{PilotError, Result};
use crate::{io, paths};
use std::path::Path;
use std::time::Duration;

/// Version of the assets compiled into this build.
pub const BUNDLED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reported when a project has never been stamped.
pub const NO_VERSION: &str = "none";

/// Read the version stamp of a target project, or [`NO_VERSION`].
pub fn current_version(root: &Path) -> String {
    match std::fs::read_to_string(paths::version_path(root)) {
        Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
        Ok(_) => NO_VERSION.to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => NO_VERSION.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read version stamp");
            NO_VERSION.to_string()
        }
    }
}

pub fn save_version(root: &Path, version: &str) -> Result<()> {
    io::atomic_write(&paths::version_path(root), version.as_bytes())
}

// ---------------------------------------------------------------------------
// Release lookup
// ---------------------------------------------------------------------------

/// Where the newest published release is looked up.
pub trait ReleaseSource {
    fn latest_release(&self) -> Result<String>;
}

/// HTTPS lookup of a JSON document carrying the latest version.
pub struct RegistryClient {
    url: String,
    pointer: String,
    timeout: Duration,
}

impl RegistryClient {
    pub fn new(url: impl Into<String>, pointer: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            pointer: pointer.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &UpdateConfig) -> Self {
        Self::new(&cfg.release_url, &cfg.version_pointer, cfg.timeout())
    }
}

impl ReleaseSource for RegistryClient {
    fn latest_release(&self) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(format!("{PACKAGE_NAME}/{BUNDLED_VERSION}"))
            .build()?;
        let body: serde_json::Value = client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .json()?;
        body.pointer(&self.pointer)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| PilotError::MissingVersion(self.pointer.clone()))
    }
}

// ---------------------------------------------------------------------------
// VersionTracker
// ---------------------------------------------------------------------------

/// Compares a project's stamp against the best-known latest release.
pub struct VersionTracker<'a> {
    source: &'a dyn ReleaseSource,
    fallback: String,
}

impl<'a> VersionTracker<'a> {
    pub fn new(source: &'a dyn ReleaseSource, fallback: impl Into<String>) -> Self {
        Self {
            source,
            fallback: fallback.into(),
        }
    }

    pub fn current(&self, root: &Path) -> String {
        current_version(root)
    }

    /// Latest published release, or `None` when the lookup failed.
    pub fn fetch_latest(&self) -> Option<String> {
        match self.source.latest_release() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("could not fetch latest release: {e}");
                None
            }
        }
    }

    /// Latest release, falling back to the bundled version on any failure.
    pub fn latest(&self) -> String {
        self.fetch_latest().unwrap_or_else(|| self.fallback.clone())
    }

    pub fn needs_update(&self, root: &Path) -> bool {
        self.current(root) != self.latest()
    }
}
