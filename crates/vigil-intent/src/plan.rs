// plan.rs — Plan discovery and scope extraction.
//
// A plan is an optional markdown document declaring the file/directory
// scope an action intends to touch. Resolution walks a fixed ordered
// candidate list and stops at the first readable file. Scope entries are
// taken from bullet lines and backtick spans under a "scope"/"files"
// section header, then filtered to paths that exist on disk. Anything
// unparseable is ignored: the resolver never blocks, and a missing plan is
// the normal unscoped state, not an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Candidate plan locations, relative to the repo root, in search order.
const PLAN_CANDIDATES: &[&str] = &[
    ".vigil/plan.md",
    "PLAN.md",
    "docs/PLAN.md",
    ".agents/plan.md",
];

/// How much of the plan text is kept as a preview.
const PREVIEW_LEN: usize = 400;

/// A resolved plan: where it was found and what scope it declares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    /// The plan file that was read.
    pub path: PathBuf,
    /// Declared scope, filtered to paths that exist on disk.
    /// Empty means the plan declares no scope restriction.
    pub declared_scope: Vec<PathBuf>,
    /// Leading text of the plan, for display.
    pub raw_text_preview: String,
}

impl Plan {
    /// Whether a root-relative path falls inside the declared scope.
    /// An empty scope restricts nothing.
    pub fn contains(&self, path: &Path) -> bool {
        if self.declared_scope.is_empty() {
            return true;
        }
        self.declared_scope
            .iter()
            .any(|scoped| path == scoped || path.starts_with(scoped))
    }
}

/// Search for a plan document under the repo root.
///
/// Returns `Ok(None)` when no candidate exists; that is the common case
/// and signals unscoped mode to downstream checks.
pub fn resolve_plan(repo_root: &Path) -> std::io::Result<Option<Plan>> {
    for candidate in PLAN_CANDIDATES {
        let path = repo_root.join(candidate);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(_) => continue, // unreadable candidate is the same as absent
        };
        let declared_scope = extract_scope(&text, repo_root);
        let raw_text_preview: String = text.chars().take(PREVIEW_LEN).collect();
        tracing::debug!(plan = %path.display(), entries = declared_scope.len(), "plan resolved");
        return Ok(Some(Plan {
            path,
            declared_scope,
            raw_text_preview,
        }));
    }
    Ok(None)
}

/// Pull scope entries out of the plan text.
///
/// Recognized layout: a markdown header containing "scope" or "files"
/// (case-insensitive) opens a section; bullet lines (`-` / `*`) inside it
/// contribute entries, taking the first backtick span when present and the
/// bare remainder otherwise. The section ends at the next header.
fn extract_scope(text: &str, repo_root: &Path) -> Vec<PathBuf> {
    let mut in_section = false;
    let mut entries = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            let lower = trimmed.to_lowercase();
            in_section = lower.contains("scope") || lower.contains("files");
            continue;
        }
        if !in_section {
            continue;
        }
        let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        else {
            continue;
        };
        let raw = match first_backtick_span(item) {
            Some(span) => span,
            None => item.trim(),
        };
        if raw.is_empty() {
            continue;
        }
        let relative = PathBuf::from(raw.trim_end_matches('/'));
        // Declared-but-nonexistent paths are dropped at resolution time.
        if repo_root.join(&relative).exists() {
            entries.push(relative);
        }
    }
    entries
}

fn first_backtick_span(s: &str) -> Option<&str> {
    let start = s.find('`')? + 1;
    let end = start + s[start..].find('`')?;
    Some(&s[start..end])
}
