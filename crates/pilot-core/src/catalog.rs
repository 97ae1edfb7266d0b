//! Versioned lists of the files this tool owns, the files users own, and the
//! files retired by earlier releases.

use std::path::{Path, PathBuf};

/// Managed files as (bundled source, project destination) pairs.
pub const MANAGED_FILES: &[(&str, &str)] = &[
    // Commands
    (".claude/commands/00_plan.md", ".claude/commands/00_plan.md"),
    (".claude/commands/01_confirm.md", ".claude/commands/01_confirm.md"),
    (".claude/commands/02_execute.md", ".claude/commands/02_execute.md"),
    (".claude/commands/03_close.md", ".claude/commands/03_close.md"),
    (".claude/commands/90_review.md", ".claude/commands/90_review.md"),
    (".claude/commands/91_document.md", ".claude/commands/91_document.md"),
    (".claude/commands/92_init.md", ".claude/commands/92_init.md"),
    // Templates
    (
        ".claude/templates/CONTEXT.md.template",
        ".claude/templates/CONTEXT.md.template",
    ),
    (
        ".claude/templates/CONTEXT-tier2.md.template",
        ".claude/templates/CONTEXT-tier2.md.template",
    ),
    (
        ".claude/templates/CONTEXT-tier3.md.template",
        ".claude/templates/CONTEXT-tier3.md.template",
    ),
    (
        ".claude/templates/SKILL.md.template",
        ".claude/templates/SKILL.md.template",
    ),
    // Hooks
    (
        ".claude/scripts/hooks/typecheck.sh",
        ".claude/scripts/hooks/typecheck.sh",
    ),
    (".claude/scripts/hooks/lint.sh", ".claude/scripts/hooks/lint.sh"),
    (
        ".claude/scripts/hooks/check-todos.sh",
        ".claude/scripts/hooks/check-todos.sh",
    ),
    (
        ".claude/scripts/hooks/branch-guard.sh",
        ".claude/scripts/hooks/branch-guard.sh",
    ),
    // Version stamp
    (".claude/.pilot-version", ".claude/.pilot-version"),
];

/// Paths the user owns once they exist. Created only when absent.
pub const USER_FILES: &[&str] = &[
    "CLAUDE.md",
    "AGENTS.md",
    ".pilot",
    ".claude/settings.json",
    ".claude/local",
];

/// Paths shipped by earlier releases and removed on update.
pub const DEPRECATED_FILES: &[&str] = &[".claude/templates/PRP.md.template"];

/// Bundled paths that land somewhere other than their bundled location.
pub const RENAMES: &[(&str, &str)] = &[("CLAUDE.md.template", "CLAUDE.md")];

/// Destination (relative to the project root) for a bundled asset path.
pub fn destination_for(bundled: &str) -> &str {
    RENAMES
        .iter()
        .find(|(from, _)| *from == bundled)
        .map(|(_, to)| *to)
        .unwrap_or(bundled)
}

/// True when `dest` (relative, `/`-separated) is a user-owned path: it equals
/// an entry, sits underneath an entry directory, or ends with `/<entry>`.
pub fn is_user_owned(dest: &str) -> bool {
    USER_FILES.iter().any(|owned| {
        dest == *owned
            || dest
                .strip_prefix(owned)
                .is_some_and(|rest| rest.starts_with('/'))
            || dest
                .strip_suffix(owned)
                .is_some_and(|head| head.ends_with('/'))
    })
}

pub fn deprecated_paths(root: &Path) -> impl Iterator<Item = (&'static str, PathBuf)> + '_ {
    DEPRECATED_FILES.iter().map(move |p| (*p, root.join(p)))
}
