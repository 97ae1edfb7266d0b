use pilot_core::version::{RegistryClient, VersionTracker, BUNDLED_VERSION};
use std::path::Path;

/// `claude-pilot version`
pub fn run(root: &Path, release_url: Option<&str>) -> anyhow::Result<()> {
    let cfg = super::load_config(root, release_url)?;
    let releases = RegistryClient::from_config(&cfg.update);
    let tracker = VersionTracker::new(&releases, BUNDLED_VERSION);

    let current = tracker.current(root);
    let latest = tracker.latest();

    println!("installed: {BUNDLED_VERSION}");
    println!("project:   {current}");
    println!("latest:    {latest}");
    if current != latest {
        println!("\nRun `claude-pilot update` to update this project.");
    }
    Ok(())
}
