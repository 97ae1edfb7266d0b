use anyhow::Context;
use pilot_core::codex::{self, CodexSetup};
use pilot_core::manifest::AssetManifest;
use pilot_core::settings::{self, MergeOutcome};
use pilot_core::update::GITIGNORE_COMMENT;
use pilot_core::version::{self, BUNDLED_VERSION};
use pilot_core::{io, paths, sync};
use std::path::Path;

use crate::embed::EmbeddedBundle;

/// `claude-pilot init`: install the bundled assets into `root`.
///
/// Safe to re-run: user-owned files that already exist are never replaced,
/// and settings.json is only ever patched key by key.
pub fn run(root: &Path, skip_codex: bool) -> anyhow::Result<()> {
    let cfg = super::load_config(root, None)?;
    println!("Initializing claude-pilot in: {}", root.display());

    let manifest = AssetManifest::curated();
    let report = sync::sync_bundle(&EmbeddedBundle, &manifest, root)
        .context("failed to install bundled assets")?;
    let (copied, failed) = report.counts();
    println!("  installed: {copied} files");
    for path in &report.skipped {
        println!("  kept:      {path}");
    }
    for (path, err) in &report.failed {
        println!("  failed:    {path} ({err})");
    }

    let statusline = settings::apply_statusline(root).context("failed to configure statusLine")?;
    print_merge("statusLine", statusline);
    let hooks = settings::apply_hooks(root).context("failed to configure hooks")?;
    print_merge("hooks", hooks);

    if io::ensure_gitignore_entry(root, paths::PILOT_GITIGNORE_ENTRY, Some(GITIGNORE_COMMENT))
        .context("failed to update .gitignore")?
    {
        println!("  added:     {} to .gitignore", paths::PILOT_GITIGNORE_ENTRY);
    }

    if !skip_codex {
        match codex::setup_codex_mcp(root, &cfg.codex) {
            Ok(CodexSetup::Configured) => println!("  codex:     MCP server added to .mcp.json"),
            Ok(_) => {}
            Err(e) => tracing::warn!("codex MCP setup failed: {e}"),
        }
    }

    version::save_version(root, BUNDLED_VERSION).context("failed to write version stamp")?;

    if failed > 0 {
        anyhow::bail!("{failed} file(s) could not be installed");
    }
    println!("\nclaude-pilot v{BUNDLED_VERSION} installed.");
    Ok(())
}

fn print_merge(section: &str, outcome: MergeOutcome) {
    match outcome {
        MergeOutcome::Created => println!("  created:   .claude/settings.json ({section})"),
        MergeOutcome::Added => println!("  added:     {section} to .claude/settings.json"),
        MergeOutcome::Rewritten(n) => println!("  updated:   {n} {section} path(s)"),
        MergeOutcome::Unchanged | MergeOutcome::Skipped => {}
    }
}
