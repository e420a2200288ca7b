// guard.rs — Proposed-write validation.
//
// Violations are collected in one pass and all reported; the reason on the
// denial is the first one found in rule order (escape, forbidden, binary,
// explosion). Path normalization is lexical: components are resolved
// against the project root without consulting the filesystem, and a `..`
// that climbs past the root is an escape regardless of what exists on disk.

use std::path::{Component, Path};

use vigil_policy::CompiledPolicy;
use vigil_protocol::{Decision, DenyReason, ProposedEdit};

/// Gate a set of proposed writes against the freshly loaded policy.
pub fn check_write(edits: &[ProposedEdit], policy: &CompiledPolicy) -> Decision {
    if policy.document.is_locked() {
        return Decision::deny(
            DenyReason::SystemLocked,
            "the system is locked; all capabilities are revoked",
        );
    }

    let mut first_reason: Option<DenyReason> = None;
    let mut details = Vec::new();
    let mut record = |reason: DenyReason, detail: String, first: &mut Option<DenyReason>| {
        if first.is_none() {
            *first = Some(reason);
        }
        details.push(detail);
    };

    let mut new_files = 0usize;
    for edit in edits {
        match normalize(&edit.path) {
            Some(normalized) => {
                if let Some(rule) = policy.path_is_forbidden(&normalized) {
                    record(
                        DenyReason::ForbiddenPath,
                        format!("'{}' matches forbidden path rule '{}'", edit.path, rule),
                        &mut first_reason,
                    );
                }
            }
            None => {
                record(
                    DenyReason::PathEscape,
                    format!("'{}' escapes the project root", edit.path),
                    &mut first_reason,
                );
            }
        }

        if is_binary(&edit.path, &edit.new_content, policy) {
            record(
                DenyReason::BinaryBlob,
                format!("'{}' contains binary content", edit.path),
                &mut first_reason,
            );
        }

        if edit.creates_file() {
            new_files += 1;
        }
    }

    let max_new = policy.document.thresholds.max_new_files;
    if new_files > max_new {
        record(
            DenyReason::FileExplosion,
            format!("{} new files in one action, over max_new_files {}", new_files, max_new),
            &mut first_reason,
        );
    }

    match first_reason {
        Some(reason) => {
            tracing::debug!(violations = details.len(), "write check failed");
            Decision::deny(
                reason,
                format!("{} filesystem rule violation(s)", details.len()),
            )
            .with_details(details)
            .with_recovery(vec![
                "Keep writes inside the project root and outside forbidden paths".to_string(),
                "Split large batches of new files into smaller actions".to_string(),
            ])
        }
        None => Decision::allow("write check passed"),
    }
}

/// Lexically resolve a proposed path relative to the project root.
/// Returns the normalized root-relative path, or None on escape.
fn normalize(raw: &str) -> Option<String> {
    let path = Path::new(raw);
    // Absolute paths are never inside the root from the caller's view;
    // the protocol carries root-relative paths only.
    if path.is_absolute() {
        return None;
    }
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(p) => parts.push(p.to_str()?),
            Component::CurDir => {}
            Component::ParentDir => {
                // Climbing past the root is an escape.
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

/// Binary heuristic: NUL byte in the content or a denylisted extension.
fn is_binary(path: &str, content: &str, policy: &CompiledPolicy) -> bool {
    if content.contains('\0') {
        return true;
    }
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    policy
        .document
        .binary_extensions
        .iter()
        .any(|denied| denied == &ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_policy::PolicyDocument;

    fn policy() -> CompiledPolicy {
        CompiledPolicy::compile(PolicyDocument::default()).unwrap()
    }

    fn edit(path: &str, content: &str) -> ProposedEdit {
        ProposedEdit {
            path: path.to_string(),
            old_content: String::new(),
            new_content: content.to_string(),
        }
    }

    fn existing_edit(path: &str, content: &str) -> ProposedEdit {
        ProposedEdit {
            path: path.to_string(),
            old_content: "previous".to_string(),
            new_content: content.to_string(),
        }
    }

    #[test]
    fn traversal_escape_denied() {
        // Classic traversal out of the project root.
        let decision = check_write(&[edit("../../etc/passwd", "x")], &policy());
        assert_eq!(decision.reason, Some(DenyReason::PathEscape));
    }

    #[test]
    fn absolute_path_denied() {
        let decision = check_write(&[edit("/etc/shadow", "x")], &policy());
        assert_eq!(decision.reason, Some(DenyReason::PathEscape));
    }

    #[test]
    fn internal_dotdot_that_stays_inside_is_fine() {
        let decision = check_write(&[existing_edit("src/sub/../main.rs", "fn main() {}")], &policy());
        assert!(decision.allowed, "{:?}", decision);
    }

    #[test]
    fn forbidden_path_denied() {
        let decision = check_write(&[edit(".git/hooks/pre-commit", "x")], &policy());
        assert_eq!(decision.reason, Some(DenyReason::ForbiddenPath));
    }

    #[test]
    fn traversal_into_forbidden_path_is_caught_after_normalization() {
        let decision = check_write(&[edit("src/../.vigil/policy.yaml", "x")], &policy());
        assert_eq!(decision.reason, Some(DenyReason::ForbiddenPath));
    }

    #[test]
    fn nul_byte_is_binary() {
        let decision = check_write(&[existing_edit("data/file.txt", "abc\0def")], &policy());
        assert_eq!(decision.reason, Some(DenyReason::BinaryBlob));
    }

    #[test]
    fn denylisted_extension_is_binary() {
        let decision = check_write(&[existing_edit("assets/logo.png", "not really png")], &policy());
        assert_eq!(decision.reason, Some(DenyReason::BinaryBlob));
    }

    #[test]
    fn file_explosion_only_counts_new_files() {
        let mut doc = PolicyDocument::default();
        doc.thresholds.max_new_files = 2;
        let policy = CompiledPolicy::compile(doc).unwrap();

        // Three edits to existing files: fine.
        let edits: Vec<ProposedEdit> = (0..3)
            .map(|i| existing_edit(&format!("src/f{}.rs", i), "x();"))
            .collect();
        assert!(check_write(&edits, &policy).allowed);

        // Three new files with max 2: explosion.
        let edits: Vec<ProposedEdit> = (0..3)
            .map(|i| edit(&format!("src/new{}.rs", i), "x();"))
            .collect();
        let decision = check_write(&edits, &policy);
        assert_eq!(decision.reason, Some(DenyReason::FileExplosion));
    }

    #[test]
    fn all_violations_reported_reason_is_first() {
        let edits = vec![
            edit("../escape.txt", "x"),
            edit(".git/config", "x"),
            existing_edit("blob.png", "x"),
        ];
        let decision = check_write(&edits, &policy());
        assert_eq!(decision.reason, Some(DenyReason::PathEscape));
        assert_eq!(decision.details.len(), 3);
    }

    #[test]
    fn clean_writes_pass() {
        let edits = vec![
            existing_edit("src/main.rs", "fn main() {}"),
            edit("src/util.rs", "pub fn u() {}"),
        ];
        assert!(check_write(&edits, &policy()).allowed);
    }
}
