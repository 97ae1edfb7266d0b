use anyhow::Context;
use clap::Subcommand;
use pilot_core::bundle::AssetBundle;
use pilot_core::generate::generate_packaged_assets;
use pilot_core::verify::verify_bundle;
use std::path::{Path, PathBuf};

use crate::embed::EmbeddedBundle;

#[derive(Subcommand)]
pub enum AssetsSubcommand {
    /// Copy the curated subset of a project's .claude tree into a bundle directory
    Generate {
        /// Project whose .claude/ tree is the source of truth
        project: PathBuf,
        /// Output directory
        out: PathBuf,
    },

    /// Check a bundle directory for missing and forbidden paths
    Verify { dir: PathBuf },

    /// List the files compiled into this binary
    List,
}

pub fn run(subcommand: AssetsSubcommand) -> anyhow::Result<()> {
    match subcommand {
        AssetsSubcommand::Generate { project, out } => generate(&project, &out),
        AssetsSubcommand::Verify { dir } => verify(&dir),
        AssetsSubcommand::List => list(),
    }
}

fn generate(project: &Path, out: &Path) -> anyhow::Result<()> {
    let count = generate_packaged_assets(project, out)
        .with_context(|| format!("failed to generate assets from {}", project.display()))?;
    println!("Generated {count} files into {}", out.display());
    Ok(())
}

fn verify(dir: &Path) -> anyhow::Result<()> {
    let violations = verify_bundle(dir);
    if violations.is_empty() {
        println!("Bundle OK: {}", dir.display());
        return Ok(());
    }
    for v in &violations {
        println!("  {v}");
    }
    anyhow::bail!("{} violation(s) in {}", violations.len(), dir.display())
}

fn list() -> anyhow::Result<()> {
    for file in EmbeddedBundle.files()? {
        println!("{file}");
    }
    Ok(())
}
