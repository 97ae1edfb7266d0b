use std::fmt;
use std::path::Path;

/// Paths every generated bundle must contain.
pub const REQUIRED_PATHS: &[&str] = &[
    ".claude/commands/00_plan.md",
    ".claude/commands/01_confirm.md",
    ".claude/commands/02_execute.md",
    ".claude/commands/03_close.md",
    ".claude/commands/CONTEXT.md",
    ".claude/agents/CONTEXT.md",
    ".claude/skills/tdd/SKILL.md",
    ".claude/skills/ralph-loop/SKILL.md",
    ".claude/guides/CONTEXT.md",
    ".claude/rules/core/workflow.md",
    ".claude/settings.json",
];

/// Paths a generated bundle must never contain. A trailing `/` marks a directory.
pub const FORBIDDEN_PATHS: &[&str] = &[
    ".claude/commands/999_publish.md",
    ".claude/skills/external/",
    ".claude/.external-skills-version",
    ".pilot/plan/",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingRequired(String),
    ForbiddenDirectory(String),
    ForbiddenFile(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingRequired(p) => write!(f, "Missing required path: {p}"),
            Violation::ForbiddenDirectory(p) => write!(f, "Forbidden directory present: {p}"),
            Violation::ForbiddenFile(p) => write!(f, "Forbidden file present: {p}"),
        }
    }
}

/// Check a generated bundle against the fixed required and forbidden lists.
/// Returns every violation found, in list order.
pub fn verify_bundle(dir: &Path) -> Vec<Violation> {
    verify_against(dir, REQUIRED_PATHS, FORBIDDEN_PATHS)
}

pub fn verify_against(dir: &Path, required: &[&str], forbidden: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for path in required {
        if !dir.join(path).exists() {
            violations.push(Violation::MissingRequired(path.to_string()));
        }
    }

    for path in forbidden {
        match path.strip_suffix('/') {
            Some(d) => {
                if dir.join(d).is_dir() {
                    violations.push(Violation::ForbiddenDirectory(path.to_string()));
                }
            }
            None => {
                if dir.join(path).exists() {
                    violations.push(Violation::ForbiddenFile(path.to_string()));
                }
            }
        }
    }

    violations
}
