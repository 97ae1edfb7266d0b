//! Curated include/exclude rules deciding which `.claude/**` files ship.
//!
//! The manifest is built once at startup and handed to every component that
//! needs it (generator, verifier, file sync). It has no mutation API; tests
//! build their own through [`AssetManifest::new`].
//!
//! Patterns use hierarchical glob semantics: `*` stays within one path
//! segment and `**` crosses directory boundaries. Exclusion always wins over
//! inclusion, and anything not explicitly included is left out.

use globset::{GlobBuilder, GlobMatcher};
use std::collections::BTreeMap;
use std::fmt;

/// How a special-case file is handled once it exists in a target project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Existence follows the manifest; content is only ever patched key by key.
    MergeOnly,
    Overwrite,
    Skip,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Policy::MergeOnly => "merge-only",
            Policy::Overwrite => "overwrite",
            Policy::Skip => "skip",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Curated pattern lists
// ---------------------------------------------------------------------------

pub const INCLUDE_PATTERNS: &[&str] = &[
    // Core commands
    ".claude/commands/00_plan.md",
    ".claude/commands/01_confirm.md",
    ".claude/commands/02_execute.md",
    ".claude/commands/03_close.md",
    ".claude/commands/90_review.md",
    ".claude/commands/91_document.md",
    ".claude/commands/92_init.md",
    ".claude/commands/CONTEXT.md",
    // Agents
    ".claude/agents/*.md",
    // Core skills (external skills are downloaded, never shipped)
    ".claude/skills/tdd/SKILL.md",
    ".claude/skills/tdd/REFERENCE.md",
    ".claude/skills/ralph-loop/SKILL.md",
    ".claude/skills/ralph-loop/REFERENCE.md",
    ".claude/skills/vibe-coding/SKILL.md",
    ".claude/skills/vibe-coding/REFERENCE.md",
    ".claude/skills/git-master/SKILL.md",
    ".claude/skills/git-master/REFERENCE.md",
    ".claude/skills/documentation-best-practices/SKILL.md",
    ".claude/skills/documentation-best-practices/REFERENCE.md",
    ".claude/skills/CONTEXT.md",
    // Guides
    ".claude/guides/*.md",
    // Templates
    ".claude/templates/*.template",
    ".claude/templates/gap-checklist.md",
    // Hooks and utility scripts
    ".claude/scripts/hooks/*.sh",
    ".claude/scripts/statusline.sh",
    ".claude/scripts/worktree-utils.sh",
    ".claude/scripts/codex-sync.sh",
    // Rules
    ".claude/rules/**",
    // Version stamp and settings
    ".claude/.pilot-version",
    ".claude/settings.json",
    // Local directory placeholder
    ".claude/local/.gitkeep",
    // Root document template, retargeted to CLAUDE.md on sync
    "CLAUDE.md.template",
];

pub const EXCLUDE_PATTERNS: &[&str] = &[
    // External skills (generated/downloaded)
    ".claude/skills/external/**",
    ".claude/.external-skills-version",
    // Repo-dev-only commands
    ".claude/commands/999_*",
    // Runtime plan state
    ".pilot/**",
    // User-owned content
    "**/CLAUDE.md",
    ".claude/local/*/**",
    ".claude/local/[!.]*",
];

pub const SPECIAL_CASE_FILES: &[(&str, Policy)] = &[(".claude/settings.json", Policy::MergeOnly)];

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Pattern {
    Glob(GlobMatcher),
    /// A pattern the glob compiler rejected; compared lexically instead.
    Literal(String),
}

impl Pattern {
    fn new(raw: &str) -> Self {
        match GlobBuilder::new(raw).literal_separator(true).build() {
            Ok(glob) => Pattern::Glob(glob.compile_matcher()),
            Err(e) => {
                tracing::debug!(pattern = raw, error = %e, "falling back to literal match");
                Pattern::Literal(raw.to_string())
            }
        }
    }

    fn is_match(&self, path: &str) -> bool {
        match self {
            Pattern::Glob(matcher) => matcher.is_match(path),
            Pattern::Literal(raw) => raw == path,
        }
    }
}

fn normalize(path: &str) -> String {
    let p = path.replace('\\', "/");
    p.strip_prefix("./").map(str::to_string).unwrap_or(p)
}

// ---------------------------------------------------------------------------
// AssetManifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AssetManifest {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    special: BTreeMap<String, Policy>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::curated()
    }
}

impl AssetManifest {
    /// The canonical manifest shipped with this release.
    pub fn curated() -> Self {
        Self::new(INCLUDE_PATTERNS, EXCLUDE_PATTERNS, SPECIAL_CASE_FILES)
    }

    pub fn new(include: &[&str], exclude: &[&str], special: &[(&str, Policy)]) -> Self {
        Self {
            include: include.iter().map(|p| Pattern::new(p)).collect(),
            exclude: exclude.iter().map(|p| Pattern::new(p)).collect(),
            special: special
                .iter()
                .map(|(path, policy)| (path.to_string(), *policy))
                .collect(),
        }
    }

    /// True when `path` matches at least one include pattern and no exclude pattern.
    pub fn should_include(&self, path: &str) -> bool {
        let path = normalize(path);
        if self.exclude.iter().any(|p| p.is_match(&path)) {
            return false;
        }
        self.include.iter().any(|p| p.is_match(&path))
    }

    pub fn is_special_case(&self, path: &str) -> bool {
        self.special.contains_key(&normalize(path))
    }

    pub fn policy(&self, path: &str) -> Option<Policy> {
        self.special.get(&normalize(path)).copied()
    }
}
