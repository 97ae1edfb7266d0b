mod cmd;
mod embed;
mod root;

use clap::{Parser, Subcommand};
use cmd::assets::AssetsSubcommand;
use pilot_core::update::MergeStrategy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "claude-pilot",
    about = "Install and update curated Claude Code commands, skills and hooks in a project",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .claude/ or .git/)
    #[arg(long, global = true, env = "PILOT_ROOT")]
    root: Option<PathBuf>,

    /// Override the release lookup URL from .claude/pilot.yaml
    #[arg(long, global = true, env = "PILOT_RELEASE_URL")]
    release_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the bundled assets into the current project
    Init {
        /// Don't register the Codex MCP server
        #[arg(long)]
        skip_codex: bool,
    },

    /// Update managed files to the latest release
    Update {
        /// auto: merge in place, manual: back up and write a merge guide
        #[arg(long, default_value = "auto")]
        strategy: MergeStrategy,

        /// Don't upgrade the installed package even if a newer release exists
        #[arg(long)]
        skip_upgrade: bool,

        /// Only report whether a newer release exists
        #[arg(long)]
        check_only: bool,
    },

    /// Show installed, project and latest versions
    Version,

    /// Packaging tools for the asset bundle
    Assets {
        #[command(subcommand)]
        subcommand: AssetsSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Init { .. } | Commands::Update { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let release_url = cli.release_url.as_deref();

    let result = match cli.command {
        Commands::Init { skip_codex } => cmd::init::run(&root, skip_codex),
        Commands::Update {
            strategy,
            skip_upgrade,
            check_only,
        } => cmd::update::run(&root, release_url, strategy, skip_upgrade, check_only),
        Commands::Version => cmd::version::run(&root, release_url),
        Commands::Assets { subcommand } => cmd::assets::run(subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
