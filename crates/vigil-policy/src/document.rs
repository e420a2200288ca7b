// document.rs — The policy document schema.
//
// The document is a singleton YAML file owned by the operator, stored at
// `.vigil/policy.yaml` under the project root. The enforcement pipeline is
// read-only with respect to it; the only writer is the out-of-band
// administrative operation (lock/unlock/set-profile), which swaps the file
// atomically. Exactly one execution_profile value is active at any read.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The global execution profile, culminating in `Locked` (panic state).
///
/// When `Locked`, every gate refuses unconditionally before looking at any
/// other input.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionProfile {
    /// Loose local development: full gateway checks, permissive thresholds.
    Dev,
    /// Normal operation.
    #[default]
    Standard,
    /// Tool calls only; every shell command is denied without evaluation.
    ExecutionOnly,
    /// Gateway checks only; write gates run advisory.
    GatewayOnly,
    /// Panic state: every capability is revoked.
    Locked,
}

impl std::fmt::Display for ExecutionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionProfile::Dev => write!(f, "dev"),
            ExecutionProfile::Standard => write!(f, "standard"),
            ExecutionProfile::ExecutionOnly => write!(f, "execution_only"),
            ExecutionProfile::GatewayOnly => write!(f, "gateway_only"),
            ExecutionProfile::Locked => write!(f, "locked"),
        }
    }
}

/// Numeric thresholds consulted by the gates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    /// Maximum lines a single edit may touch before the diff analyzer flags it.
    #[serde(default = "default_max_lines_per_edit")]
    pub max_lines_per_edit: usize,
    /// Maximum total lines across all edits in one action.
    #[serde(default = "default_max_total_lines")]
    pub max_total_lines: usize,
    /// Maximum files touched in one action.
    #[serde(default = "default_max_files_per_pass")]
    pub max_files_per_pass: usize,
    /// Maximum newly created files in one action.
    #[serde(default = "default_max_new_files")]
    pub max_new_files: usize,
    /// Minimum comment-to-code ratio when the generated-code heuristic fires.
    #[serde(default = "default_min_comment_ratio")]
    pub min_comment_ratio: f64,
    /// Confidence at or above which an intent classification is high-confidence.
    #[serde(default = "default_intent_confidence_threshold")]
    pub intent_confidence_threshold: f64,
    /// Topic-drift score above which the entropy monitor escalates.
    #[serde(default = "default_entropy_threshold")]
    pub entropy_threshold: f64,
    /// Repeat edits to one file within a session before escalation.
    #[serde(default = "default_circular_retry_threshold")]
    pub circular_retry_threshold: usize,
    /// Diff size at which the post-write verifier requires logging evidence.
    #[serde(default = "default_min_lines_for_logging")]
    pub min_lines_for_logging: usize,
}

fn default_max_lines_per_edit() -> usize {
    400
}
fn default_max_total_lines() -> usize {
    1200
}
fn default_max_files_per_pass() -> usize {
    12
}
fn default_max_new_files() -> usize {
    8
}
fn default_min_comment_ratio() -> f64 {
    0.05
}
fn default_intent_confidence_threshold() -> f64 {
    0.6
}
fn default_entropy_threshold() -> f64 {
    0.7
}
fn default_circular_retry_threshold() -> usize {
    3
}
fn default_min_lines_for_logging() -> usize {
    150
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_lines_per_edit: default_max_lines_per_edit(),
            max_total_lines: default_max_total_lines(),
            max_files_per_pass: default_max_files_per_pass(),
            max_new_files: default_max_new_files(),
            min_comment_ratio: default_min_comment_ratio(),
            intent_confidence_threshold: default_intent_confidence_threshold(),
            entropy_threshold: default_entropy_threshold(),
            circular_retry_threshold: default_circular_retry_threshold(),
            min_lines_for_logging: default_min_lines_for_logging(),
        }
    }
}

/// Named groups of prohibited patterns, scanned over proposed code text.
///
/// Each entry is a regex. Groups are compiled into a typed rule table at
/// policy load time; an invalid pattern fails the load (fail closed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProhibitedPatterns {
    /// Placeholder/incompleteness markers.
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
    /// Mock/fake/demo data markers.
    #[serde(default = "default_mocks")]
    pub mocks: Vec<String>,
    /// Unsafe escape primitives (process spawning, dynamic eval, raw fds).
    #[serde(default = "default_escape_primitives")]
    pub escape_primitives: Vec<String>,
    /// Assumption/hack language.
    #[serde(default = "default_assumptions")]
    pub assumptions: Vec<String>,
}

fn default_placeholders() -> Vec<String> {
    vec![
        r"(?i)\bTODO\b".to_string(),
        r"(?i)\bFIXME\b".to_string(),
        r"(?i)\bnot\s+implemented\b".to_string(),
        r"(?i)\bunimplemented!\s*\(".to_string(),
        r"(?i)\bplaceholder\b".to_string(),
        r"(?i)\bcoming\s+soon\b".to_string(),
    ]
}

fn default_mocks() -> Vec<String> {
    vec![
        r"(?i)\bmock(ed|_data|_response)?\b".to_string(),
        r"(?i)\bfake_\w+".to_string(),
        r"(?i)\bdummy\s+(data|value|response)\b".to_string(),
        r"(?i)\bhardcoded\s+(response|result)\b".to_string(),
    ]
}

fn default_escape_primitives() -> Vec<String> {
    vec![
        r"\bos\.system\s*\(".to_string(),
        r"\bsubprocess\.(Popen|call|run)\b".to_string(),
        r"\beval\s*\(".to_string(),
        r"\bexec\s*\(".to_string(),
        r"\b__import__\s*\(".to_string(),
        r"\bsocket\.socket\s*\(".to_string(),
        r"\bos\.(dup2?|fdopen)\s*\(".to_string(),
        r"\bgetattr\s*\(\s*__builtins__".to_string(),
    ]
}

fn default_assumptions() -> Vec<String> {
    vec![
        r"(?i)\bassum(e|ing)\s+this\s+works\b".to_string(),
        r"(?i)\bquick\s+hack\b".to_string(),
        r"(?i)\btemporary\s+workaround\b".to_string(),
        r"(?i)\bshould\s+be\s+fine\b".to_string(),
    ]
}

/// The versioned policy document. Singleton, loaded fresh per call.
///
/// Missing fields fall back to serde defaults so an operator can keep a
/// minimal file; an unparseable file is a hard error, never a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyDocument {
    /// Monotonic document version, bumped by administrative writes.
    #[serde(default = "default_version")]
    pub version: u32,

    /// The active execution profile. Exactly one value at any read.
    #[serde(default)]
    pub execution_profile: ExecutionProfile,

    /// Tools the gateway may permit. Anything absent is denied.
    #[serde(default = "default_tool_allowlist")]
    pub tool_allowlist: BTreeSet<String>,

    /// Tools that open a session; must be the first gateway call.
    #[serde(default = "default_session_open_tools")]
    pub session_open_tools: BTreeSet<String>,

    /// Tools that write; require prompt-unlock and an identity token.
    #[serde(default = "default_write_tools")]
    pub write_tools: BTreeSet<String>,

    /// Ordered command block patterns (regex); first match denies.
    #[serde(default = "default_command_block_patterns")]
    pub command_block_patterns: Vec<String>,

    /// Named groups of prohibited code patterns.
    #[serde(default)]
    pub prohibited_patterns: ProhibitedPatterns,

    /// Path prefixes/globs the write guard refuses (relative to root).
    #[serde(default = "default_forbidden_paths")]
    pub forbidden_paths: Vec<String>,

    /// File extensions treated as binary by the write guard.
    #[serde(default = "default_binary_extensions")]
    pub binary_extensions: Vec<String>,

    /// Numeric gate thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Optional external verification command run by the post-write verifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_command: Option<String>,

    /// Deadline for the external verification command.
    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,

    /// When this document was last replaced (set by administrative writes).
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

fn default_tool_allowlist() -> BTreeSet<String> {
    [
        "session.start",
        "fs.read",
        "fs.write",
        "fs.edit",
        "search.grep",
        "search.glob",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_session_open_tools() -> BTreeSet<String> {
    ["session.start"].into_iter().map(String::from).collect()
}

fn default_write_tools() -> BTreeSet<String> {
    ["fs.write", "fs.edit"].into_iter().map(String::from).collect()
}

fn default_command_block_patterns() -> Vec<String> {
    vec![
        r"\brm\s+(-\w*\s+)*-?\w*[rf]".to_string(),
        r"\bgit\s+push\s+.*--force\b".to_string(),
        r"\bchmod\s+777\b".to_string(),
        r"\bcurl\b.*\|\s*(ba)?sh\b".to_string(),
        r"\bsudo\b".to_string(),
        r">\s*/dev/sd[a-z]".to_string(),
        r"\bmkfs\b".to_string(),
    ]
}

fn default_forbidden_paths() -> Vec<String> {
    vec![
        ".git/**".to_string(),
        ".vigil/**".to_string(),
        ".env".to_string(),
        "**/*.pem".to_string(),
        "**/id_rsa*".to_string(),
    ]
}

fn default_binary_extensions() -> Vec<String> {
    ["bin", "exe", "so", "dylib", "o", "a", "png", "jpg", "gif", "pdf", "zip", "tar", "gz"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_verify_timeout_secs() -> u64 {
    60
}

impl Default for ProhibitedPatterns {
    fn default() -> Self {
        Self {
            placeholders: default_placeholders(),
            mocks: default_mocks(),
            escape_primitives: default_escape_primitives(),
            assumptions: default_assumptions(),
        }
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            execution_profile: ExecutionProfile::Standard,
            tool_allowlist: default_tool_allowlist(),
            session_open_tools: default_session_open_tools(),
            write_tools: default_write_tools(),
            command_block_patterns: default_command_block_patterns(),
            prohibited_patterns: ProhibitedPatterns::default(),
            forbidden_paths: default_forbidden_paths(),
            binary_extensions: default_binary_extensions(),
            thresholds: Thresholds::default(),
            verify_command: None,
            verify_timeout_secs: default_verify_timeout_secs(),
            updated_at: Utc::now(),
        }
    }
}

impl PolicyDocument {
    /// Whether the global panic lock is set.
    pub fn is_locked(&self) -> bool {
        self.execution_profile == ExecutionProfile::Locked
    }
}
