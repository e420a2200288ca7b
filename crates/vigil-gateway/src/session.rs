// session.rs — Session lifecycle as an explicit state machine.
//
// The caller supplies opaque markers accumulated from prior successful
// gateway calls. Rather than testing marker strings ad hoc at each check,
// the markers are collapsed into a three-state machine with defined legal
// transitions:
//
//     Uninitialized -> SessionOpen -> PromptUnlocked
//
// A missing marker means "not yet granted", never an error. Markers only
// accumulate within a session, so the derived phase is monotonic too.

use vigil_protocol::SessionMarkers;

/// Marker recorded after a successful session-opening tool call.
pub const MARKER_SESSION_INITIALIZED: &str = "session-initialized";

/// Marker recorded after the prompt gate has unlocked writes.
pub const MARKER_PROMPT_UNLOCKED: &str = "prompt-unlocked";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    /// No gateway call has succeeded yet; only session-opening tools run.
    Uninitialized,
    /// The session is open; non-write tools run.
    SessionOpen,
    /// The prompt gate has unlocked; write tools run.
    PromptUnlocked,
}

impl SessionPhase {
    /// Derive the phase from the caller's marker set.
    ///
    /// `prompt-unlocked` implies an open session even if the caller sent
    /// only the one marker; the phases are ordered, not independent flags.
    pub fn from_markers(markers: &SessionMarkers) -> Self {
        if markers.contains(MARKER_PROMPT_UNLOCKED) {
            SessionPhase::PromptUnlocked
        } else if markers.contains(MARKER_SESSION_INITIALIZED) {
            SessionPhase::SessionOpen
        } else {
            SessionPhase::Uninitialized
        }
    }

    /// Whether the session has been opened.
    pub fn is_open(&self) -> bool {
        *self >= SessionPhase::SessionOpen
    }

    /// Whether write tools are unlocked.
    pub fn writes_unlocked(&self) -> bool {
        *self >= SessionPhase::PromptUnlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(names: &[&str]) -> SessionMarkers {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_markers_are_uninitialized() {
        let phase = SessionPhase::from_markers(&markers(&[]));
        assert_eq!(phase, SessionPhase::Uninitialized);
        assert!(!phase.is_open());
        assert!(!phase.writes_unlocked());
    }

    #[test]
    fn initialized_marker_opens_session() {
        let phase = SessionPhase::from_markers(&markers(&[MARKER_SESSION_INITIALIZED]));
        assert_eq!(phase, SessionPhase::SessionOpen);
        assert!(phase.is_open());
        assert!(!phase.writes_unlocked());
    }

    #[test]
    fn unlock_implies_open() {
        // The caller may send only prompt-unlocked; phases are ordered.
        let phase = SessionPhase::from_markers(&markers(&[MARKER_PROMPT_UNLOCKED]));
        assert_eq!(phase, SessionPhase::PromptUnlocked);
        assert!(phase.is_open());
        assert!(phase.writes_unlocked());
    }

    #[test]
    fn unknown_markers_are_ignored() {
        let phase = SessionPhase::from_markers(&markers(&["some-future-marker"]));
        assert_eq!(phase, SessionPhase::Uninitialized);
    }
}
