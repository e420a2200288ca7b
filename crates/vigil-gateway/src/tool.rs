// tool.rs — Tool invocation gate.
//
// Evaluation chain, first terminal check wins:
//
// 1. Is the profile `locked`? → Deny SystemLocked (before anything else)
// 2. Is the tool in the allowlist? → No → Deny ToolNotAllowed
// 3. Session-opening tool called after the session opened? → Deny
// 4. Non-opening tool called before the session opened? → Deny
// 5. Write tool without prompt-unlock? → Deny PromptNotUnlocked
// 6. Write tool without an identity token? → Deny IdentityTokenMissing
// 7. Otherwise → Allow
//
// The identity token is pass-through: this gate checks that a non-empty
// token accompanies the write, never that the token is correct. Correctness
// belongs to an external authority.

use vigil_policy::CompiledPolicy;
use vigil_protocol::{Decision, DenyReason, SessionMarkers};

use crate::session::SessionPhase;

/// Gate one tool invocation against the freshly loaded policy.
pub fn check_tool(
    tool_name: &str,
    identity_token: Option<&str>,
    markers: &SessionMarkers,
    policy: &CompiledPolicy,
) -> Decision {
    let doc = &policy.document;

    // Lock supremacy: nothing else is consulted when the panic lock is set.
    if doc.is_locked() {
        tracing::warn!(tool = tool_name, "tool call refused: system locked");
        return locked_decision();
    }

    if !doc.tool_allowlist.contains(tool_name) {
        return Decision::deny(
            DenyReason::ToolNotAllowed,
            format!("tool '{}' is not in the policy allowlist", tool_name),
        )
        .with_recovery(vec![format!(
            "Ask an operator to add '{}' to tool_allowlist in the policy document",
            tool_name
        )]);
    }

    let phase = SessionPhase::from_markers(markers);
    let is_opener = doc.session_open_tools.contains(tool_name);

    if is_opener {
        // A session-opening tool must be the first gateway call.
        if phase.is_open() {
            return Decision::deny(
                DenyReason::SessionNotInitialized,
                format!(
                    "session-opening tool '{}' called after the session was already opened",
                    tool_name
                ),
            )
            .with_recovery(vec![
                "Continue with the existing session instead of reopening it".to_string(),
            ]);
        }
        tracing::debug!(tool = tool_name, "session-opening tool allowed");
        return Decision::allow(format!("tool '{}' opens the session", tool_name));
    }

    if !phase.is_open() {
        return Decision::deny(
            DenyReason::SessionNotInitialized,
            format!("tool '{}' called before the session was opened", tool_name),
        )
        .with_recovery(vec![
            "Call a session-opening tool first (e.g., session.start)".to_string(),
        ]);
    }

    if doc.write_tools.contains(tool_name) {
        if !phase.writes_unlocked() {
            return Decision::deny(
                DenyReason::PromptNotUnlocked,
                format!("write tool '{}' requires the prompt-unlocked marker", tool_name),
            )
            .with_recovery(vec![
                "Pass the prompt gate to obtain the prompt-unlocked marker".to_string(),
            ]);
        }
        // Presence only: the token travels through unvalidated.
        if identity_token.map_or(true, |t| t.is_empty()) {
            return Decision::deny(
                DenyReason::IdentityTokenMissing,
                format!(
                    "write tool '{}' requires a non-empty content-identity token",
                    tool_name
                ),
            )
            .with_recovery(vec![
                "Supply the content-identity token issued for this write".to_string(),
            ]);
        }
    }

    tracing::debug!(tool = tool_name, phase = ?phase, "tool call allowed");
    Decision::allow(format!("tool '{}' permitted", tool_name))
}

pub(crate) fn locked_decision() -> Decision {
    Decision::deny(
        DenyReason::SystemLocked,
        "the system is locked; all capabilities are revoked",
    )
    .with_recovery(vec![
        "An operator must run `vigil unlock` to restore capabilities".to_string(),
    ])
}
