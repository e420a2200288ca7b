// request.rs — The structured request the host agent sends per call.
//
// One request per hook per action. The `action` field selects which gate
// evaluates the payload; `session_markers` is an opaque set of strings
// recording prior successful gateway calls in this session. A missing
// marker always means "not yet granted", never an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Opaque session markers supplied by the caller on every request.
///
/// Markers accumulate monotonically within one session. The gateway only
/// ever tests membership; it never interprets marker contents beyond the
/// two well-known names it defines itself.
pub type SessionMarkers = BTreeSet<String>;

/// One proposed edit: a path plus the text before and after.
///
/// `old_content` is empty for newly created files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposedEdit {
    /// Path relative to the project root.
    pub path: String,
    /// Content before the edit (empty for new files).
    #[serde(default)]
    pub old_content: String,
    /// Content after the edit.
    pub new_content: String,
}

impl ProposedEdit {
    /// Whether this edit creates a file that did not exist before.
    pub fn creates_file(&self) -> bool {
        self.old_content.is_empty()
    }
}

/// Which check the host agent is requesting, with its payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HookAction {
    /// Gate a tool invocation (Capability Gateway).
    ToolCall {
        tool_name: String,
        /// Content-identity token for write tools. Presence is checked;
        /// correctness is validated by an external authority.
        #[serde(default)]
        identity_token: Option<String>,
    },
    /// Gate a shell command (Capability Gateway).
    Command { command: String },
    /// Gate proposed code text before it is written (Code Policy Enforcer).
    CodeCheck {
        edits: Vec<ProposedEdit>,
        #[serde(default)]
        mode: ReviewMode,
    },
    /// Gate proposed filesystem writes (Filesystem Write Guard).
    WriteCheck { edits: Vec<ProposedEdit> },
    /// Score a diff against size/coherence thresholds (Diff Quality Analyzer).
    DiffQuality {
        edits: Vec<ProposedEdit>,
        #[serde(default)]
        mode: ReviewMode,
    },
    /// Classify a natural-language prompt (Intent Classifier; never blocks).
    Classify { prompt: String },
    /// Re-examine written files after the fact (Post-Write Verifier).
    PostWrite {
        written_paths: Vec<String>,
        #[serde(default)]
        prompt: String,
        edits: Vec<ProposedEdit>,
        #[serde(default)]
        mode: ReviewMode,
    },
    /// Check the session's edit history for degenerate loops (never blocks).
    Entropy { history: Vec<EditEvent> },
}

/// The review mode the host agent is operating in.
///
/// Modes tighten which violations are fatal: `Plan` is the most permissive,
/// `Ship` escalates advisory findings to denials, and `Strict` additionally
/// makes plan-scope violations fatal in the post-write verifier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    /// Exploratory planning; most findings are advisory.
    #[default]
    Plan,
    /// Bug-repair mode; mock/fake patterns become fatal.
    Repair,
    /// Read-only review mode.
    Audit,
    /// Final pass; threshold violations become fatal.
    Ship,
    /// Ship plus fatal plan-scope enforcement.
    Strict,
}

impl std::fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewMode::Plan => write!(f, "plan"),
            ReviewMode::Repair => write!(f, "repair"),
            ReviewMode::Audit => write!(f, "audit"),
            ReviewMode::Ship => write!(f, "ship"),
            ReviewMode::Strict => write!(f, "strict"),
        }
    }
}

/// One edit event in the session history, as reported by the caller.
///
/// The entropy monitor is stateless; the caller carries the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditEvent {
    /// Path that was edited.
    pub path: String,
    /// The prompt that drove the edit (may be empty).
    #[serde(default)]
    pub prompt: String,
}

/// A single structured message per call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookRequest {
    /// The specific check being requested, with its payload.
    #[serde(flatten)]
    pub action: HookAction,
    /// Opaque markers from prior successful gateway calls in this session.
    #[serde(default)]
    pub session_markers: SessionMarkers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_round_trip() {
        let req = HookRequest {
            action: HookAction::ToolCall {
                tool_name: "fs.write".to_string(),
                identity_token: Some("abc123".to_string()),
            },
            session_markers: ["session-initialized".to_string()].into_iter().collect(),
        };
        let json = serde_json::to_string(&req).unwrap();
        let restored: HookRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, req);
    }

    #[test]
    fn action_tag_is_snake_case() {
        let req = HookRequest {
            action: HookAction::Command {
                command: "ls".to_string(),
            },
            session_markers: SessionMarkers::new(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"action\":\"command\""));
    }

    #[test]
    fn missing_markers_default_to_empty() {
        let json = r#"{"action":"classify","prompt":"fix the bug"}"#;
        let req: HookRequest = serde_json::from_str(json).unwrap();
        assert!(req.session_markers.is_empty());
        match req.action {
            HookAction::Classify { prompt } => assert_eq!(prompt, "fix the bug"),
            other => panic!("expected Classify, got {:?}", other),
        }
    }

    #[test]
    fn review_mode_defaults_to_plan() {
        let json = r#"{"action":"code_check","edits":[]}"#;
        let req: HookRequest = serde_json::from_str(json).unwrap();
        match req.action {
            HookAction::CodeCheck { mode, .. } => assert_eq!(mode, ReviewMode::Plan),
            other => panic!("expected CodeCheck, got {:?}", other),
        }
    }

    #[test]
    fn new_file_detection() {
        let edit = ProposedEdit {
            path: "src/new.rs".to_string(),
            old_content: String::new(),
            new_content: "fn main() {}".to_string(),
        };
        assert!(edit.creates_file());
    }
}
