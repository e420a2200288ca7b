// hook.rs — Evaluate one hook request from stdin and emit a decision.
//
// This is the hot path called by the host agent on every gated action.
// The policy document is read fresh from disk per invocation; any failure
// to read, parse, or compile it produces a ConfigError denial (fail
// closed) rather than a process error.

use std::io::Read;
use std::path::Path;

use vigil_entropy::check_entropy;
use vigil_gateway::{check_command, check_tool};
use vigil_intent::{classify, resolve_plan};
use vigil_policy::{CompiledPolicy, PolicyError, PolicyStore};
use vigil_protocol::{Decision, DenyReason, HookAction, HookRequest};

pub fn execute(project_root: &Path) -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let request: HookRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            return finish(&Decision::deny(
                DenyReason::ConfigError,
                format!("malformed hook request: {}", e),
            ));
        }
    };

    let store = PolicyStore::for_project(project_root);
    let policy = match store.load() {
        Ok(policy) => policy,
        Err(e) => return finish(&config_error(&e)),
    };

    finish(&dispatch(&request, &policy, project_root))
}

/// Print the decision as JSON and exit with its code (0 or 2).
fn finish(decision: &Decision) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(decision)?);
    std::process::exit(decision.exit_code());
}

/// Fail-closed denial for an unloadable policy document.
fn config_error(error: &PolicyError) -> Decision {
    tracing::error!(error = %error, "policy load failed; denying");
    Decision::deny(
        DenyReason::ConfigError,
        format!("policy unavailable: {}", error),
    )
    .with_recovery(vec![
        "inspect .vigil/policy.yaml for syntax or pattern errors".to_string(),
        "run `vigil policy init` to write a fresh default document".to_string(),
    ])
}

/// Route the request to the gate its action names.
fn dispatch(request: &HookRequest, policy: &CompiledPolicy, project_root: &Path) -> Decision {
    match &request.action {
        HookAction::ToolCall {
            tool_name,
            identity_token,
        } => check_tool(
            tool_name,
            identity_token.as_deref(),
            &request.session_markers,
            policy,
        ),
        HookAction::Command { command } => check_command(command, policy),
        HookAction::CodeCheck { edits, mode } => {
            vigil_codegate::check_code(edits, *mode, policy)
        }
        HookAction::WriteCheck { edits } => vigil_fsguard::check_write(edits, policy),
        HookAction::DiffQuality { edits, mode } => {
            vigil_codegate::check_diff_quality(edits, *mode, policy)
        }
        HookAction::Classify { prompt } => {
            let classification = classify(prompt, policy);
            let details = classification
                .scores
                .iter()
                .map(|(category, score)| format!("{}: {:.1}", category, score))
                .collect();
            Decision::allow(format!(
                "intent: {} (confidence {:.2}{})",
                classification.category,
                classification.confidence,
                if classification.high_confidence {
                    ""
                } else {
                    ", below threshold"
                },
            ))
            .with_details(details)
        }
        HookAction::PostWrite {
            written_paths,
            prompt,
            edits,
            mode,
        } => {
            // A plan resolution failure is not a policy failure; verify
            // without plan scope rather than denying.
            let plan = match resolve_plan(project_root) {
                Ok(plan) => plan,
                Err(e) => {
                    tracing::warn!(error = %e, "plan resolution failed; verifying without plan");
                    None
                }
            };
            let intent = classify(prompt, policy);
            vigil_verify::verify_post_write(
                written_paths,
                edits,
                plan.as_ref(),
                &intent,
                *mode,
                policy,
            )
        }
        HookAction::Entropy { history } => check_entropy(history, &policy.document),
    }
}
