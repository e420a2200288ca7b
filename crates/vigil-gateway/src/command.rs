// command.rs — Shell command gate.
//
// Evaluation chain:
//
// 1. Profile `locked` → Deny SystemLocked
// 2. Profile `execution_only` → Deny CommandBlocked, no pattern evaluation
// 3. Block patterns in declared order; first match denies with the matched
//    pattern in details
// 4. Otherwise → Allow

use vigil_policy::{CompiledPolicy, ExecutionProfile};
use vigil_protocol::{Decision, DenyReason};

use crate::tool::locked_decision;

/// Gate one shell command against the freshly loaded policy.
pub fn check_command(command: &str, policy: &CompiledPolicy) -> Decision {
    let doc = &policy.document;

    if doc.is_locked() {
        tracing::warn!(command, "command refused: system locked");
        return locked_decision();
    }

    // execution_only revokes the shell entirely: no regex, no exceptions.
    if doc.execution_profile == ExecutionProfile::ExecutionOnly {
        return Decision::deny(
            DenyReason::CommandBlocked,
            "shell commands are disabled under the execution_only profile",
        )
        .with_recovery(vec![
            "Use an allowlisted tool instead of a shell command".to_string(),
            "An operator can change the execution profile to re-enable commands".to_string(),
        ]);
    }

    for (pattern, regex) in &policy.command_rules {
        if regex.is_match(command) {
            tracing::debug!(command, pattern, "command blocked");
            return Decision::deny(
                DenyReason::CommandBlocked,
                format!("command matches block pattern '{}'", pattern),
            )
            .with_details(vec![format!("matched pattern: {}", pattern)])
            .with_recovery(vec![
                "Rewrite the command to avoid the blocked operation".to_string(),
            ]);
        }
    }

    Decision::allow("command permitted")
}
