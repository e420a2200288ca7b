// pipeline.rs — End-to-end integration test for the enforcement pipeline.
//
// Exercises the full lifecycle a host agent drives through the hook binary,
// using the library crates directly against a real on-disk policy:
//
//   1. `vigil policy init` writes the default document
//   2. Session opens through the gateway, markers accumulate
//   3. Code and write gates evaluate proposed edits
//   4. `vigil lock` revokes every capability mid-session
//   5. `vigil unlock` restores the exact same calls
//   6. A corrupted policy document fails closed
//
// Every gate reloads the policy from disk per call, so lock/unlock take
// effect on the next call with no process restart.

use std::collections::BTreeSet;
use std::fs;

use tempfile::TempDir;
use vigil_fsguard::check_write;
use vigil_gateway::{
    check_command, check_tool, MARKER_PROMPT_UNLOCKED, MARKER_SESSION_INITIALIZED,
};
use vigil_policy::{PolicyDocument, PolicyStore};
use vigil_protocol::request::ReviewMode;
use vigil_protocol::{DenyReason, ProposedEdit};

fn edit(path: &str, new_content: &str) -> ProposedEdit {
    ProposedEdit {
        path: path.to_string(),
        old_content: String::new(),
        new_content: new_content.to_string(),
    }
}

/// Full pipeline flow, from policy init through lock and unlock.
#[test]
fn pipeline_session_to_lock_and_back() {
    // =========================================================
    // 1. Initialize the policy document on disk
    // =========================================================

    let project = TempDir::new().unwrap();
    let store = PolicyStore::for_project(project.path());
    store.init(&PolicyDocument::default()).unwrap();
    assert!(store.path().exists());

    // =========================================================
    // 2. Open the session and accumulate markers
    // =========================================================

    let mut markers: BTreeSet<String> = BTreeSet::new();

    // A read tool before the session opens is refused.
    let policy = store.load().unwrap();
    let premature = check_tool("fs.read", None, &markers, &policy);
    assert_eq!(premature.reason, Some(DenyReason::SessionNotInitialized));

    // The opener is the first permitted call.
    let opened = check_tool("session.start", None, &markers, &policy);
    assert!(opened.allowed);
    markers.insert(MARKER_SESSION_INITIALIZED.to_string());

    // Reads work now; writes still need the prompt gate.
    let policy = store.load().unwrap();
    assert!(check_tool("fs.read", None, &markers, &policy).allowed);
    let early_write = check_tool("fs.write", Some("tok-1"), &markers, &policy);
    assert_eq!(early_write.reason, Some(DenyReason::PromptNotUnlocked));

    markers.insert(MARKER_PROMPT_UNLOCKED.to_string());
    let write = check_tool("fs.write", Some("tok-1"), &markers, &policy);
    assert!(write.allowed);

    // =========================================================
    // 3. Gate proposed edits through the write and code gates
    // =========================================================

    let policy = store.load().unwrap();

    // Clean content inside the project passes.
    let clean = vec![edit("src/main.rs", "fn main() {\n    run();\n}\n")];
    assert!(check_write(&clean, &policy).allowed);

    // Traversal out of the project root is refused.
    let escape = vec![edit("../../etc/passwd", "root::0:0::/:/bin/sh\n")];
    let denied = check_write(&escape, &policy);
    assert_eq!(denied.reason, Some(DenyReason::PathEscape));

    // A placeholder marker in ship mode is fatal, with the offending line.
    let stubbed = vec![edit("src/lib.rs", "pub fn run() {\n    // TODO: wire up\n}\n")];
    let scanned = vigil_codegate::check_code(&stubbed, ReviewMode::Ship, &policy);
    assert_eq!(scanned.reason, Some(DenyReason::ProhibitedPattern));
    assert!(scanned.details.iter().any(|d| d.contains("src/lib.rs:2")));

    // =========================================================
    // 4. Engage the panic lock: every gate refuses on its next call
    // =========================================================

    store.lock().unwrap();
    let policy = store.load().unwrap();

    let locked_write = check_tool("fs.write", Some("tok-1"), &markers, &policy);
    assert_eq!(locked_write.reason, Some(DenyReason::SystemLocked));
    assert!(locked_write
        .recovery_steps
        .iter()
        .any(|s| s.contains("vigil unlock")));

    let locked_cmd = check_command("ls", &policy);
    assert_eq!(locked_cmd.reason, Some(DenyReason::SystemLocked));

    let locked_edit = check_write(&clean, &policy);
    assert_eq!(locked_edit.reason, Some(DenyReason::SystemLocked));

    // =========================================================
    // 5. Unlock: the identical calls succeed again
    // =========================================================

    store.unlock().unwrap();
    let policy = store.load().unwrap();

    assert!(check_tool("fs.write", Some("tok-1"), &markers, &policy).allowed);
    assert!(check_command("ls", &policy).allowed);
    assert!(check_write(&clean, &policy).allowed);
}

/// A corrupted policy document denies by failing to load, not by crashing.
#[test]
fn pipeline_fails_closed_on_corrupt_policy() {
    let project = TempDir::new().unwrap();
    let store = PolicyStore::for_project(project.path());
    store.init(&PolicyDocument::default()).unwrap();
    assert!(store.load().is_ok());

    // Overwrite with YAML that cannot parse into a document.
    fs::write(store.path(), "execution_profile: [not, a, profile]\n").unwrap();
    assert!(store.load().is_err());

    // A missing document is equally fatal: no defaults are synthesized.
    fs::remove_file(store.path()).unwrap();
    assert!(store.load().is_err());
}

/// An invalid regex in the document is a compile error at load time.
#[test]
fn pipeline_fails_closed_on_invalid_pattern() {
    let project = TempDir::new().unwrap();
    let store = PolicyStore::for_project(project.path());

    let mut doc = PolicyDocument::default();
    doc.prohibited_patterns
        .placeholders
        .push("(unclosed".to_string());
    store.init(&doc).unwrap();

    assert!(store.load().is_err());
}
