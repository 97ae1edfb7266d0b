use crate::config::UpdateConfig;
use crate::error::{PilotError, Result};
use std::process::Command;

/// Replaces the installed package with the newest published release.
pub trait PackageUpgrader {
    fn upgrade(&self) -> Result<()>;
}

/// Runs an external package manager; success is its exit status.
#[derive(Debug, Clone)]
pub struct CommandUpgrader {
    program: String,
    args: Vec<String>,
}

impl CommandUpgrader {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from the configured argv. An empty argv yields an upgrader that
    /// always fails with [`PilotError::ExecutableNotFound`].
    pub fn from_config(cfg: &UpdateConfig) -> Self {
        let mut argv = cfg.upgrade_command.iter().cloned();
        let program = argv.next().unwrap_or_default();
        Self::new(program, argv.collect())
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PackageUpgrader for CommandUpgrader {
    fn upgrade(&self) -> Result<()> {
        if self.program.is_empty() {
            return Err(PilotError::ExecutableNotFound("(empty upgrade command)".into()));
        }
        let exe = which::which(&self.program)
            .map_err(|_| PilotError::ExecutableNotFound(self.program.clone()))?;

        tracing::info!("running {}", self.command_line());
        let output = Command::new(exe).args(&self.args).output()?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(PilotError::UpgradeFailed(format!(
            "{} exited with {}: {}",
            self.program,
            output.status,
            stderr.trim()
        )))
    }
}
