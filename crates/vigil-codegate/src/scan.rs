// scan.rs — Prohibited-pattern scanning over proposed edits.
//
// Every edit's new text is matched line by line against the compiled rule
// table. Each match becomes a Finding (pattern name, path, 1-based line,
// trimmed excerpt). Whether a category is fatal depends on the review mode:
//
//   category         | plan      | repair/audit/ship/strict
//   -----------------+-----------+-------------------------
//   placeholder      | fatal     | fatal
//   escape primitive | fatal     | fatal
//   assumption       | fatal     | fatal
//   mock             | advisory  | fatal
//
// The logic-preservation check rides along: a net decrease in executable
// statements across the edit set denies with LogicReduced in repair/ship/
// strict modes and is advisory otherwise. It is a heuristic, not a parser;
// false positives are acceptable, silent false negatives are not.

use vigil_policy::{CompiledPolicy, PatternCategory};
use vigil_protocol::{Decision, DenyReason, Finding, ProposedEdit, ReviewMode};

use crate::logic::logic_delta;

/// Scan proposed edits for prohibited patterns and logic deletion.
pub fn check_code(edits: &[ProposedEdit], mode: ReviewMode, policy: &CompiledPolicy) -> Decision {
    if policy.document.is_locked() {
        return Decision::deny(
            DenyReason::SystemLocked,
            "the system is locked; all capabilities are revoked",
        );
    }

    let mut fatal: Vec<Finding> = Vec::new();
    let mut advisory: Vec<Finding> = Vec::new();

    for edit in edits {
        for (idx, line) in edit.new_content.lines().enumerate() {
            for rule in &policy.code_rules {
                if rule.regex.is_match(line) {
                    let finding = Finding {
                        pattern: rule.name.clone(),
                        path: edit.path.clone(),
                        line: idx + 1,
                        excerpt: line.trim().to_string(),
                    };
                    if is_fatal(rule.category, mode) {
                        fatal.push(finding);
                    } else {
                        advisory.push(finding);
                    }
                }
            }
        }
    }

    if !fatal.is_empty() {
        tracing::debug!(count = fatal.len(), mode = %mode, "prohibited patterns found");
        return Decision::deny(
            DenyReason::ProhibitedPattern,
            format!("{} prohibited pattern match(es) in proposed code", fatal.len()),
        )
        .with_findings(&fatal)
        .with_recovery(vec![
            "Replace each flagged construct with a complete implementation".to_string(),
            "Re-run the check after the offending lines are removed".to_string(),
        ]);
    }

    // Logic preservation across the whole edit set: decreases in one edit
    // may be compensated by growth in another edit of the same action.
    let delta = logic_delta(edits);
    if delta < 0 {
        let detail = format!(
            "executable statements decreased by {} across {} edit(s)",
            -delta,
            edits.len()
        );
        let fatal_mode = matches!(
            mode,
            ReviewMode::Repair | ReviewMode::Ship | ReviewMode::Strict
        );
        if fatal_mode {
            return Decision::deny(
                DenyReason::LogicReduced,
                "edit removes executable logic without compensating additions",
            )
            .with_details(vec![detail])
            .with_recovery(vec![
                "Restore the removed statements, or split deletion into a reviewed refactor"
                    .to_string(),
            ]);
        }
        let mut details: Vec<String> = advisory.iter().map(|f| f.to_string()).collect();
        details.push(detail);
        return Decision::allow("code check passed with advisories").with_details(details);
    }

    if !advisory.is_empty() {
        return Decision::allow("code check passed with advisories").with_findings(&advisory);
    }
    Decision::allow("code check passed")
}

fn is_fatal(category: PatternCategory, mode: ReviewMode) -> bool {
    match category {
        PatternCategory::Placeholder
        | PatternCategory::EscapePrimitive
        | PatternCategory::Assumption => true,
        // Mocks are tolerated while planning, forbidden everywhere else;
        // repair mode is the explicit tightening called out in the contract.
        PatternCategory::Mock => !matches!(mode, ReviewMode::Plan),
    }
}
