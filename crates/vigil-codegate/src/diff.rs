// diff.rs — Diff quality analysis.
//
// Computes a DiffSummary per action (never cached) and checks it against
// the policy thresholds. The thresholds are identical in every mode; only
// the consequence differs: advisory details for plan/repair/audit, a
// denial carrying the same details for ship/strict. This symmetry is load
// bearing and covered by tests.

use vigil_policy::CompiledPolicy;
use vigil_protocol::{Decision, DenyReason, ProposedEdit, ReviewMode};

/// Size/coherence metrics over one proposed edit set. Ephemeral:
/// recomputed on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffSummary {
    /// Changed-line count per edit, in input order.
    pub per_edit_line_counts: Vec<usize>,
    /// Total changed lines across the edit set.
    pub total_lines: usize,
    /// Number of files touched.
    pub file_count: usize,
    /// Comment lines over changed lines across the set.
    pub comment_ratio: f64,
}

impl DiffSummary {
    /// Compute metrics from the proposed edits.
    pub fn compute(edits: &[ProposedEdit]) -> Self {
        let per_edit_line_counts: Vec<usize> = edits
            .iter()
            .map(|e| e.new_content.lines().count())
            .collect();
        let total_lines: usize = per_edit_line_counts.iter().sum();
        let comment_lines: usize = edits
            .iter()
            .flat_map(|e| e.new_content.lines())
            .filter(|l| is_comment(l))
            .count();
        let comment_ratio = if total_lines > 0 {
            comment_lines as f64 / total_lines as f64
        } else {
            0.0
        };
        Self {
            per_edit_line_counts,
            total_lines,
            file_count: edits.len(),
            comment_ratio,
        }
    }
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("//")
        || trimmed.starts_with('#')
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("--")
}

/// Heuristic for machine-emitted code: one large low-comment edit.
/// Only when this fires is the comment-ratio threshold checked at all.
fn looks_generated(summary: &DiffSummary, policy: &CompiledPolicy) -> bool {
    let t = &policy.document.thresholds;
    summary
        .per_edit_line_counts
        .iter()
        .any(|&n| n > t.max_lines_per_edit / 2)
        && summary.comment_ratio < t.min_comment_ratio / 2.0
}

/// Score the edit set against the diff thresholds.
///
/// Violations are advisory (`allowed = true`, details populated) in every
/// mode except `ship`/`strict`, where the identical details become fatal.
pub fn check_diff_quality(
    edits: &[ProposedEdit],
    mode: ReviewMode,
    policy: &CompiledPolicy,
) -> Decision {
    if policy.document.is_locked() {
        return Decision::deny(
            DenyReason::SystemLocked,
            "the system is locked; all capabilities are revoked",
        );
    }

    let summary = DiffSummary::compute(edits);
    let t = &policy.document.thresholds;
    let mut details = Vec::new();

    for (i, &count) in summary.per_edit_line_counts.iter().enumerate() {
        if count > t.max_lines_per_edit {
            details.push(format!(
                "edit {} ({}) has {} lines, over max_lines_per_edit {}",
                i, edits[i].path, count, t.max_lines_per_edit
            ));
        }
    }
    if summary.total_lines > t.max_total_lines {
        details.push(format!(
            "total {} lines, over max_total_lines {}",
            summary.total_lines, t.max_total_lines
        ));
    }
    if summary.file_count > t.max_files_per_pass {
        details.push(format!(
            "{} files touched, over max_files_per_pass {}",
            summary.file_count, t.max_files_per_pass
        ));
    }
    if looks_generated(&summary, policy) && summary.comment_ratio < t.min_comment_ratio {
        details.push(format!(
            "comment ratio {:.3} below min_comment_ratio {:.3} on a generated-looking diff",
            summary.comment_ratio, t.min_comment_ratio
        ));
    }

    if details.is_empty() {
        return Decision::allow("diff quality within thresholds");
    }

    tracing::debug!(violations = details.len(), mode = %mode, "diff thresholds exceeded");
    if matches!(mode, ReviewMode::Ship | ReviewMode::Strict) {
        Decision::deny(
            DenyReason::DiffQuality,
            format!("{} diff quality violation(s) in ship mode", details.len()),
        )
        .with_details(details)
        .with_recovery(vec![
            "Split the change into smaller, reviewed passes".to_string(),
        ])
    } else {
        Decision::allow("diff quality advisories").with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_policy::PolicyDocument;

    fn small_policy() -> CompiledPolicy {
        let mut doc = PolicyDocument::default();
        doc.thresholds.max_lines_per_edit = 5;
        doc.thresholds.max_total_lines = 8;
        doc.thresholds.max_files_per_pass = 2;
        CompiledPolicy::compile(doc).unwrap()
    }

    fn edit_with_lines(path: &str, lines: usize) -> ProposedEdit {
        ProposedEdit {
            path: path.to_string(),
            old_content: String::new(),
            new_content: (0..lines)
                .map(|i| format!("let v{} = {};\n", i, i))
                .collect(),
        }
    }

    #[test]
    fn summary_counts_lines_and_files() {
        let edits = vec![edit_with_lines("a.rs", 3), edit_with_lines("b.rs", 4)];
        let summary = DiffSummary::compute(&edits);
        assert_eq!(summary.per_edit_line_counts, vec![3, 4]);
        assert_eq!(summary.total_lines, 7);
        assert_eq!(summary.file_count, 2);
    }

    #[test]
    fn comment_ratio_computed() {
        let edits = vec![ProposedEdit {
            path: "a.rs".to_string(),
            old_content: String::new(),
            new_content: "// one\nlet a = 1;\n// two\nlet b = 2;\n".to_string(),
        }];
        let summary = DiffSummary::compute(&edits);
        assert!((summary.comment_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn advisory_fatal_symmetry() {
        // Same violation: advisory under plan, fatal under ship, details equal.
        let edits = vec![edit_with_lines("a.rs", 10)];
        let policy = small_policy();

        let plan = check_diff_quality(&edits, ReviewMode::Plan, &policy);
        assert!(plan.allowed);
        assert!(!plan.details.is_empty());

        let ship = check_diff_quality(&edits, ReviewMode::Ship, &policy);
        assert!(!ship.allowed);
        assert_eq!(ship.reason, Some(DenyReason::DiffQuality));
        assert_eq!(plan.details, ship.details);
    }

    #[test]
    fn file_count_violation_reported() {
        let edits = vec![
            edit_with_lines("a.rs", 1),
            edit_with_lines("b.rs", 1),
            edit_with_lines("c.rs", 1),
        ];
        let decision = check_diff_quality(&edits, ReviewMode::Plan, &small_policy());
        assert!(decision.allowed);
        assert!(decision
            .details
            .iter()
            .any(|d| d.contains("max_files_per_pass")));
    }

    #[test]
    fn within_thresholds_is_clean_everywhere() {
        let edits = vec![edit_with_lines("a.rs", 2)];
        let policy = small_policy();
        for mode in [ReviewMode::Plan, ReviewMode::Ship] {
            let decision = check_diff_quality(&edits, mode, &policy);
            assert!(decision.allowed);
            assert!(decision.details.is_empty());
        }
    }

    #[test]
    fn comment_ratio_only_checked_when_generated_heuristic_fires() {
        // A small low-comment edit must not trip the ratio threshold.
        let edits = vec![edit_with_lines("a.rs", 2)];
        let decision = check_diff_quality(&edits, ReviewMode::Ship, &small_policy());
        assert!(decision.allowed);

        // A big comment-free blob does.
        let mut doc = PolicyDocument::default();
        doc.thresholds.max_lines_per_edit = 10;
        let policy = CompiledPolicy::compile(doc).unwrap();
        let blob = vec![edit_with_lines("gen.rs", 9)];
        let decision = check_diff_quality(&blob, ReviewMode::Ship, &policy);
        assert!(decision
            .details
            .iter()
            .any(|d| d.contains("min_comment_ratio")));
    }
}
