// postwrite.rs — The post-write verifier.
//
// Combines three independent checks over already-written files, then runs
// the optional external verification command. Severity rules:
//
//   check          | fatal when            | otherwise
//   ---------------+-----------------------+-----------
//   scope          | mode == strict        | advisory
//   semantic match | never                 | advisory
//   observability  | mode in {ship,strict} | advisory
//   external check | always (non-zero/timeout)
//
// Absence never blocks: no plan means no scope check, no configured
// command means no external check. A negative signal always blocks.

use std::path::Path;
use std::time::Duration;

use regex::Regex;

use vigil_intent::{Classification, Plan};
use vigil_policy::CompiledPolicy;
use vigil_protocol::{Decision, DenyReason, ProposedEdit, ReviewMode};

use crate::external::{run_external_check, ExternalCheck};

/// Re-examine written files against plan scope, intent, and observability.
pub fn verify_post_write(
    written_paths: &[String],
    edits: &[ProposedEdit],
    plan: Option<&Plan>,
    intent: &Classification,
    mode: ReviewMode,
    policy: &CompiledPolicy,
) -> Decision {
    if policy.document.is_locked() {
        return Decision::deny(
            DenyReason::SystemLocked,
            "the system is locked; all capabilities are revoked",
        );
    }

    let mut details = Vec::new();
    let mut fatal_reason: Option<DenyReason> = None;

    // (a) Scope compliance. Only a plan with a non-empty declared scope
    // restricts anything; a missing plan is unscoped mode, not a violation.
    if let Some(plan) = plan {
        if !plan.declared_scope.is_empty() {
            let out_of_scope: Vec<&String> = written_paths
                .iter()
                .filter(|p| !plan.contains(Path::new(p.as_str())))
                .collect();
            for path in &out_of_scope {
                details.push(format!(
                    "'{}' is outside the plan's declared scope ({})",
                    path,
                    plan.path.display()
                ));
            }
            if !out_of_scope.is_empty() && mode == ReviewMode::Strict {
                fatal_reason.get_or_insert(DenyReason::ScopeViolation);
            }
        }
    }

    // (b) Semantic match: do the introduced identifiers echo the intent?
    // Always advisory; a mismatch is a hint, not proof of a wrong change.
    let diff_text: String = edits
        .iter()
        .map(|e| e.new_content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if !diff_text.is_empty() && !semantic_overlap(intent, &diff_text) {
        details.push(format!(
            "no keyword overlap between intent '{}' and identifiers in the diff",
            intent.category
        ));
    }

    // (c) Observability: large diffs must leave evidence of logging.
    let total_lines: usize = edits.iter().map(|e| e.new_content.lines().count()).sum();
    let min_lines = policy.document.thresholds.min_lines_for_logging;
    if total_lines > min_lines && !has_logging_evidence(&diff_text) {
        details.push(format!(
            "{} changed lines with no logging/metric calls (threshold {})",
            total_lines, min_lines
        ));
        if matches!(mode, ReviewMode::Ship | ReviewMode::Strict) {
            fatal_reason.get_or_insert(DenyReason::VerificationFailed);
        }
    }

    // External verification command: absence is not a signal, a negative
    // result always blocks regardless of mode.
    if let Some(command) = &policy.document.verify_command {
        let timeout = Duration::from_secs(policy.document.verify_timeout_secs);
        match run_external_check(command, timeout) {
            ExternalCheck::Passed => details.push(format!("external check '{}' passed", command)),
            ExternalCheck::Failed { exit_code } => {
                return Decision::deny(
                    DenyReason::VerificationFailed,
                    format!(
                        "external check '{}' exited {}",
                        command,
                        exit_code.map_or("abnormally".to_string(), |c| c.to_string())
                    ),
                )
                .with_details(details)
                .with_recovery(vec![
                    "Run the verification command locally and fix the reported failures"
                        .to_string(),
                ]);
            }
            ExternalCheck::TimedOut => {
                return Decision::deny(
                    DenyReason::Timeout,
                    format!(
                        "external check '{}' exceeded {}s",
                        command, policy.document.verify_timeout_secs
                    ),
                )
                .with_details(details);
            }
            ExternalCheck::SpawnError { message } => {
                // A configured command that cannot start is a failed check,
                // not a skipped one.
                return Decision::deny(
                    DenyReason::VerificationFailed,
                    format!("external check '{}' could not start: {}", command, message),
                )
                .with_details(details);
            }
        }
    }

    match fatal_reason {
        Some(reason) => Decision::deny(
            reason,
            format!("post-write verification failed in {} mode", mode),
        )
        .with_details(details)
        .with_recovery(vec![
            "Bring the written files back inside the declared scope".to_string(),
            "Add logging to large code paths before shipping".to_string(),
        ]),
        None if details.is_empty() => Decision::allow("post-write verification passed"),
        None => Decision::allow("post-write verification passed with advisories")
            .with_details(details),
    }
}

/// Whether any intent keyword (or word from the classified vocabulary)
/// appears among the identifiers introduced by the diff.
fn semantic_overlap(intent: &Classification, diff_text: &str) -> bool {
    let lower = diff_text.to_lowercase();
    intent
        .category
        .keywords()
        .iter()
        .any(|k| lower.contains(k))
}

/// Evidence that the diff emits logs or metrics.
fn has_logging_evidence(diff_text: &str) -> bool {
    // Covers tracing/log macros, common logger calls, and metric counters.
    static PATTERNS: &[&str] = &[
        r"\b(tracing|log)::(trace|debug|info|warn|error)!",
        r"\blogger?\.(debug|info|warn|warning|error)\b",
        r"\bconsole\.(log|warn|error)\b",
        r"\bmetrics?\.(increment|counter|gauge|histogram)\b",
        r"\bprintln!\s*\(",
    ];
    PATTERNS.iter().any(|p| {
        Regex::new(p)
            .map(|re| re.is_match(diff_text))
            .unwrap_or(false)
    })
}
