//! Key-by-key patching of `.claude/settings.json`.
//!
//! Two merges share one write protocol: the candidate document goes to a
//! `settings.json.tmp` sibling, is parsed back from disk, then renamed over
//! the real file. If any step fails the temp file is removed and the backup
//! taken before the change (if any) is copied back, so the on-disk document
//! is either the old one or the new one. Keys this module does not own are
//! carried through untouched.

use crate::backup;
use crate::error::{PilotError, Result};
use crate::{io, paths};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Shell token that expands to the project root inside hook commands.
pub const PROJECT_DIR_VAR: &str = "$CLAUDE_PROJECT_DIR";

/// Quoted form of [`PROJECT_DIR_VAR`] every generated command starts with.
pub const PROJECT_DIR_PREFIX: &str = "\"$CLAUDE_PROJECT_DIR\"/";

/// Relative prefix recognized as a project-local script path.
const RELATIVE_SCRIPT_PREFIX: &str = ".claude/";

pub const STATUSLINE_KEY: &str = "statusLine";
pub const HOOKS_KEY: &str = "hooks";

pub const STATUSLINE_COMMAND: &str = "\"$CLAUDE_PROJECT_DIR\"/.claude/scripts/statusline.sh";

/// What a merge did to the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No settings file existed; a new one was written.
    Created,
    /// A missing section was added to an existing file.
    Added,
    /// This many hook commands were qualified with the project root.
    Rewritten(usize),
    /// Nothing needed changing; the file was not touched.
    Unchanged,
    /// No settings file to merge into.
    Skipped,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn hook_command(script: &str) -> Value {
    json!({
        "type": "command",
        "command": format!("{PROJECT_DIR_PREFIX}.claude/scripts/hooks/{script}"),
    })
}

pub fn default_statusline() -> Value {
    json!({
        "type": "command",
        "command": STATUSLINE_COMMAND,
    })
}

/// Hook set installed into a settings file that has no `hooks` section.
pub fn default_hooks() -> Value {
    json!({
        "PreToolUse": [
            {
                "matcher": "Edit|Write",
                "hooks": [hook_command("typecheck.sh"), hook_command("lint.sh")],
            },
            {
                "matcher": "Bash",
                "hooks": [hook_command("branch-guard.sh")],
            },
        ],
        "PostToolUse": [
            {
                "matcher": "Edit|Write",
                "hooks": [hook_command("typecheck.sh")],
            },
        ],
        "Stop": [
            {
                "hooks": [hook_command("check-todos.sh")],
            },
        ],
    })
}

// ---------------------------------------------------------------------------
// Merges
// ---------------------------------------------------------------------------

/// Ensure the settings file carries a `statusLine` section.
///
/// An existing section is left exactly as the user wrote it. When the file
/// does not exist it is created holding only the status line.
pub fn apply_statusline(root: &Path) -> Result<MergeOutcome> {
    let path = paths::settings_path(root);
    io::ensure_dir(&paths::claude_dir(root))?;

    if !path.exists() {
        let mut doc = Map::new();
        doc.insert(STATUSLINE_KEY.to_string(), default_statusline());
        write_document(&path, &doc, None)?;
        tracing::info!("created settings.json with statusLine configuration");
        return Ok(MergeOutcome::Created);
    }

    let mut doc = read_document(&path)?;
    if doc.contains_key(STATUSLINE_KEY) {
        tracing::info!("statusLine already configured, preserving existing config");
        return Ok(MergeOutcome::Unchanged);
    }

    let backup = try_backup(&path);
    doc.insert(STATUSLINE_KEY.to_string(), default_statusline());
    write_document(&path, &doc, backup.as_deref())?;
    tracing::info!("statusLine configuration added to settings.json");
    Ok(MergeOutcome::Added)
}

/// Install the default hook set, or qualify relative hook script paths
/// with the project root in an existing one.
///
/// Commands that do not start with `.claude/`, and commands that already
/// reference the project root, are left as they are. When nothing needs
/// rewriting the file is not touched and no backup is taken.
pub fn apply_hooks(root: &Path) -> Result<MergeOutcome> {
    let path = paths::settings_path(root);
    if !path.exists() {
        tracing::info!("settings.json not found, skipping hooks update");
        return Ok(MergeOutcome::Skipped);
    }

    let mut doc = read_document(&path)?;
    let Some(hooks) = doc.get_mut(HOOKS_KEY) else {
        tracing::info!("adding default hooks configuration");
        let backup = try_backup(&path);
        doc.insert(HOOKS_KEY.to_string(), default_hooks());
        write_document(&path, &doc, backup.as_deref())?;
        return Ok(MergeOutcome::Added);
    };

    let rewritten = qualify_hook_paths(hooks);
    if rewritten == 0 {
        tracing::info!("hooks already use {PROJECT_DIR_VAR} paths");
        return Ok(MergeOutcome::Unchanged);
    }

    tracing::info!("updating {rewritten} hook path(s) to {PROJECT_DIR_VAR} pattern");
    let backup = try_backup(&path);
    write_document(&path, &doc, backup.as_deref())?;
    Ok(MergeOutcome::Rewritten(rewritten))
}

/// Walk event → matcher → hook entries and qualify each relative command.
/// Entries of any other shape are skipped. Returns the number rewritten.
fn qualify_hook_paths(hooks: &mut Value) -> usize {
    let Some(events) = hooks.as_object_mut() else {
        return 0;
    };
    let mut count = 0;
    for matchers in events.values_mut().filter_map(Value::as_array_mut) {
        for matcher in matchers.iter_mut() {
            let Some(entries) = matcher.get_mut("hooks").and_then(Value::as_array_mut) else {
                continue;
            };
            for entry in entries.iter_mut() {
                if let Some(Value::String(command)) = entry.get_mut("command") {
                    if let Some(qualified) = qualify_command(command) {
                        *command = qualified;
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

fn qualify_command(command: &str) -> Option<String> {
    if command.contains(PROJECT_DIR_VAR) || !command.starts_with(RELATIVE_SCRIPT_PREFIX) {
        return None;
    }
    Some(format!("{PROJECT_DIR_PREFIX}{command}"))
}

// ---------------------------------------------------------------------------
// Read / write protocol
// ---------------------------------------------------------------------------

/// Parse the settings file. Anything but a JSON object is rejected.
pub fn read_document(path: &Path) -> Result<Map<String, Value>> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| PilotError::InvalidJson {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PilotError::NotAnObject(path.to_path_buf())),
    }
}

/// Sibling path the candidate document is staged at.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn try_backup(path: &Path) -> Option<PathBuf> {
    match backup::backup_settings(path) {
        Ok(p) => {
            tracing::info!("backup created: {}", p.display());
            Some(p)
        }
        Err(e) => {
            tracing::warn!("could not back up settings.json, continuing without: {e}");
            None
        }
    }
}

/// Stage, validate and swap in `doc`, rolling back from `backup` on failure.
pub fn write_document(path: &Path, doc: &Map<String, Value>, backup: Option<&Path>) -> Result<()> {
    let staging = staging_path(path);
    let Err(e) = stage_and_swap(path, &staging, doc) else {
        return Ok(());
    };

    tracing::error!("error writing {}: {e}", path.display());
    if staging.is_file() {
        if let Err(rm) = fs::remove_file(&staging) {
            tracing::warn!("could not remove {}: {rm}", staging.display());
        }
    }
    if let Some(backup) = backup.filter(|b| b.is_file()) {
        match fs::copy(backup, path) {
            Ok(_) => tracing::info!("restored settings.json from backup"),
            Err(restore) => tracing::error!("could not restore settings.json: {restore}"),
        }
    }
    Err(e)
}

fn stage_and_swap(path: &Path, staging: &Path, doc: &Map<String, Value>) -> Result<()> {
    let mut text = serde_json::to_string_pretty(doc)?;
    text.push('\n');
    fs::write(staging, &text)?;

    let written = fs::read_to_string(staging)?;
    serde_json::from_str::<Value>(&written)
        .map_err(|e| PilotError::ValidationFailed(format!("{}: {e}", staging.display())))?;

    fs::rename(staging, path)?;
    Ok(())
}
