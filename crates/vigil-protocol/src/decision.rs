// decision.rs — The Decision type returned by every hook.
//
// Every gate in the pipeline produces exactly one Decision per call.
// A denial is terminal for that call: no gate retries, no gate attempts
// partial success, and no gate reports success while having skipped a
// check. The constructors make the "denial always has a reason and a
// message" invariant unrepresentable to violate.

use serde::{Deserialize, Serialize};

/// Why a hook denied an action.
///
/// This is the complete denial taxonomy. Serialized snake_case so the host
/// agent can switch on it without string matching on prose.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The policy document was unreadable or malformed (fail closed).
    ConfigError,
    /// The requested tool is not in the policy allowlist.
    ToolNotAllowed,
    /// A gateway call arrived before the session was opened.
    SessionNotInitialized,
    /// A write tool was called without the prompt-unlocked marker.
    PromptNotUnlocked,
    /// A write tool was called without a content-identity token.
    IdentityTokenMissing,
    /// The global panic lock is set; every capability is revoked.
    SystemLocked,
    /// The command matched a block pattern (or the profile forbids commands).
    CommandBlocked,
    /// Proposed code matched a prohibited pattern group.
    ProhibitedPattern,
    /// An edit removed executable statements without compensating growth.
    LogicReduced,
    /// A proposed path resolves outside the project root.
    PathEscape,
    /// A proposed path matched the forbidden-path list.
    ForbiddenPath,
    /// Proposed content is binary, not text.
    BinaryBlob,
    /// Too many new files created in a single action.
    FileExplosion,
    /// A written path falls outside the plan's declared scope (strict mode).
    ScopeViolation,
    /// The external verification command exited non-zero.
    VerificationFailed,
    /// The external verification command exceeded its deadline.
    Timeout,
    /// Diff quality thresholds were exceeded in ship profile.
    DiffQuality,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DenyReason::ConfigError => "config_error",
            DenyReason::ToolNotAllowed => "tool_not_allowed",
            DenyReason::SessionNotInitialized => "session_not_initialized",
            DenyReason::PromptNotUnlocked => "prompt_not_unlocked",
            DenyReason::IdentityTokenMissing => "identity_token_missing",
            DenyReason::SystemLocked => "system_locked",
            DenyReason::CommandBlocked => "command_blocked",
            DenyReason::ProhibitedPattern => "prohibited_pattern",
            DenyReason::LogicReduced => "logic_reduced",
            DenyReason::PathEscape => "path_escape",
            DenyReason::ForbiddenPath => "forbidden_path",
            DenyReason::BinaryBlob => "binary_blob",
            DenyReason::FileExplosion => "file_explosion",
            DenyReason::ScopeViolation => "scope_violation",
            DenyReason::VerificationFailed => "verification_failed",
            DenyReason::Timeout => "timeout",
            DenyReason::DiffQuality => "diff_quality",
        };
        write!(f, "{}", s)
    }
}

/// A single rule-match record attached to a Decision.
///
/// Findings carry enough context (pattern name, file, 1-based line, excerpt)
/// for a human to locate the violation without re-running the scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    /// Name of the rule/pattern that matched (e.g., "placeholder:todo").
    pub pattern: String,
    /// File the match was found in.
    pub path: String,
    /// 1-based line number of the match.
    pub line: usize,
    /// The offending line, trimmed.
    pub excerpt: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}",
            self.path, self.line, self.pattern, self.excerpt
        )
    }
}

/// The output of every hook.
///
/// `allowed = false` always implies a reason and a non-empty message; use
/// [`Decision::allow`] / [`Decision::deny`] rather than struct literals so
/// the invariant holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    /// Whether the action may proceed.
    pub allowed: bool,
    /// Denial reason; `None` exactly when `allowed` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    /// Human-readable one-line summary.
    pub message: String,
    /// Ordered supporting detail lines (findings, advisory notes).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    /// Ordered steps a human can take to unblock the action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovery_steps: Vec<String>,
}

impl Decision {
    /// An allowing decision with a summary message.
    pub fn allow(message: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: None,
            message: message.into(),
            details: Vec::new(),
            recovery_steps: Vec::new(),
        }
    }

    /// A denying decision. The message must describe the violation; callers
    /// should add recovery steps with [`Decision::with_recovery`].
    pub fn deny(reason: DenyReason, message: impl Into<String>) -> Self {
        let message = message.into();
        debug_assert!(!message.is_empty(), "denial message must be non-empty");
        Self {
            allowed: false,
            reason: Some(reason),
            message,
            details: Vec::new(),
            recovery_steps: Vec::new(),
        }
    }

    /// Attach ordered detail lines.
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Attach findings as detail lines, one per finding.
    pub fn with_findings(mut self, findings: &[Finding]) -> Self {
        self.details = findings.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Attach ordered recovery steps.
    pub fn with_recovery(mut self, steps: Vec<String>) -> Self {
        self.recovery_steps = steps;
        self
    }

    /// The process exit code the hook binary reports to the host agent:
    /// 0 = continue, 2 = halt-with-reason. There is no third state.
    pub fn exit_code(&self) -> i32 {
        if self.allowed {
            0
        } else {
            2
        }
    }
}
