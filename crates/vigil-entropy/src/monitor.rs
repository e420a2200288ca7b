// monitor.rs — Session Entropy Monitor.
//
// Watches the edit history of an agent session for two degradation signals:
//
// 1. Circular edits — the same file edited repeatedly, suggesting the agent
//    is retrying without making progress.
// 2. Topic drift — consecutive prompts share too little vocabulary,
//    suggesting the session has wandered from its original task.
//
// The monitor is strictly advisory: it always returns an allowed decision
// and surfaces signals as details. Halting on a statistical signal would
// punish legitimate iterative work.

use std::collections::{BTreeMap, HashSet};

use vigil_policy::document::PolicyDocument;
use vigil_protocol::decision::Decision;
use vigil_protocol::request::EditEvent;

/// Which degradation signal fired.
#[derive(Debug, Clone, PartialEq)]
pub enum EntropySignal {
    /// A file edited at or above the circular-retry threshold.
    CircularEdits { path: String, count: usize },
    /// Vocabulary overlap between consecutive prompts fell below threshold.
    TopicDrift { drift_score: f64 },
}

/// A computed view of the session's edit history.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyReport {
    /// How many edit events were analyzed.
    pub window_size: usize,
    /// Edit counts per path, for paths edited more than once.
    pub repeat_counts: BTreeMap<String, usize>,
    /// Drift score in [0, 1]: fraction of consecutive prompt pairs with no
    /// shared vocabulary. 0.0 means every pair overlaps; 1.0 means none do.
    pub drift_score: f64,
    pub signals: Vec<EntropySignal>,
}

/// Split a prompt into a lowercase word set, dropping short stopword-ish
/// tokens that would make every pair of prompts look related.
fn prompt_words(prompt: &str) -> HashSet<String> {
    prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Compute an entropy report from the session's edit history.
pub fn compute_entropy(history: &[EditEvent], policy: &PolicyDocument) -> EntropyReport {
    let thresholds = &policy.thresholds;

    // Circular edits: count events per path.
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for event in history {
        *counts.entry(event.path.clone()).or_insert(0) += 1;
    }
    let repeat_counts: BTreeMap<String, usize> = counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(path, &count)| (path.clone(), count))
        .collect();

    let mut signals = Vec::new();
    for (path, &count) in &repeat_counts {
        if count >= thresholds.circular_retry_threshold {
            signals.push(EntropySignal::CircularEdits {
                path: path.clone(),
                count,
            });
        }
    }

    // Topic drift: fraction of consecutive prompt pairs with disjoint
    // vocabulary. Pairs where either prompt is empty are skipped.
    let mut pairs = 0usize;
    let mut disjoint = 0usize;
    for window in history.windows(2) {
        let a = prompt_words(&window[0].prompt);
        let b = prompt_words(&window[1].prompt);
        if a.is_empty() || b.is_empty() {
            continue;
        }
        pairs += 1;
        if a.is_disjoint(&b) {
            disjoint += 1;
        }
    }
    let drift_score = if pairs > 0 {
        disjoint as f64 / pairs as f64
    } else {
        0.0
    };
    if pairs > 0 && drift_score >= thresholds.entropy_threshold {
        signals.push(EntropySignal::TopicDrift { drift_score });
    }

    EntropyReport {
        window_size: history.len(),
        repeat_counts,
        drift_score,
        signals,
    }
}

/// Evaluate the session's edit history against the degradation thresholds.
///
/// Always returns an allowed decision. Fired signals are reported as details
/// so the caller can surface them to the operator.
pub fn check_entropy(history: &[EditEvent], policy: &PolicyDocument) -> Decision {
    let report = compute_entropy(history, policy);

    if report.signals.is_empty() {
        return Decision::allow("session entropy within thresholds");
    }

    let mut details = Vec::new();
    for signal in &report.signals {
        match signal {
            EntropySignal::CircularEdits { path, count } => {
                tracing::warn!(path = %path, count, "circular edit pattern detected");
                details.push(format!(
                    "{} edited {} times this session (threshold {}); the session may be retrying without progress",
                    path, count, policy.thresholds.circular_retry_threshold,
                ));
            }
            EntropySignal::TopicDrift { drift_score } => {
                tracing::warn!(drift_score, "prompt topic drift detected");
                details.push(format!(
                    "prompt topic drift score {:.2} exceeds {:.2}; consecutive prompts share little vocabulary",
                    drift_score, policy.thresholds.entropy_threshold,
                ));
            }
        }
    }
    details.push(
        "consider restating the task in a plan file and switching to plan-scoped review"
            .to_string(),
    );

    Decision::allow("session entropy advisories").with_details(details)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn event(path: &str, prompt: &str) -> EditEvent {
        EditEvent {
            path: path.to_string(),
            prompt: prompt.to_string(),
        }
    }

    fn policy() -> PolicyDocument {
        PolicyDocument::default()
    }

    #[test]
    fn empty_history_is_quiet() {
        let decision = check_entropy(&[], &policy());
        assert!(decision.allowed);
        assert!(decision.details.is_empty());
    }

    #[test]
    fn distinct_paths_produce_no_signal() {
        let history = vec![
            event("src/main.rs", "implement the parser module"),
            event("src/lib.rs", "implement the parser exports"),
            event("src/parser.rs", "implement the parser core"),
        ];
        let decision = check_entropy(&history, &policy());
        assert!(decision.allowed);
        assert!(decision.details.is_empty());
    }

    #[test]
    fn repeated_path_at_threshold_fires_circular_signal() {
        // Default circular_retry_threshold is 3.
        let history = vec![
            event("src/auth.rs", "fix the auth token check"),
            event("src/auth.rs", "fix the auth token check again"),
            event("src/auth.rs", "fix the auth token check properly"),
        ];
        let report = compute_entropy(&history, &policy());
        assert!(report.signals.iter().any(|s| matches!(
            s,
            EntropySignal::CircularEdits { path, count: 3 } if path == "src/auth.rs"
        )));

        let decision = check_entropy(&history, &policy());
        assert!(decision.allowed, "monitor must never block");
        assert!(decision
            .details
            .iter()
            .any(|d| d.contains("src/auth.rs") && d.contains("3 times")));
    }

    #[test]
    fn two_edits_stay_below_threshold() {
        let history = vec![
            event("src/auth.rs", "fix the auth token check"),
            event("src/auth.rs", "fix the auth token expiry"),
        ];
        let report = compute_entropy(&history, &policy());
        assert_eq!(report.repeat_counts.get("src/auth.rs"), Some(&2));
        assert!(report.signals.is_empty());
    }

    #[test]
    fn related_prompts_score_zero_drift() {
        let history = vec![
            event("src/a.rs", "refactor the config loader"),
            event("src/b.rs", "refactor the config parser"),
            event("src/c.rs", "refactor the config defaults"),
        ];
        let report = compute_entropy(&history, &policy());
        assert_eq!(report.drift_score, 0.0);
    }

    #[test]
    fn unrelated_prompts_fire_drift_signal() {
        // Every consecutive pair is disjoint → drift score 1.0, above the
        // default entropy_threshold of 0.7.
        let history = vec![
            event("src/a.rs", "implement database migrations"),
            event("src/b.rs", "tweak frontend styling colors"),
            event("src/c.rs", "rewrite deployment scripts"),
        ];
        let report = compute_entropy(&history, &policy());
        assert!((report.drift_score - 1.0).abs() < f64::EPSILON);
        assert!(report
            .signals
            .iter()
            .any(|s| matches!(s, EntropySignal::TopicDrift { .. })));

        let decision = check_entropy(&history, &policy());
        assert!(decision.allowed, "monitor must never block");
        assert!(decision.details.iter().any(|d| d.contains("topic drift")));
    }

    #[test]
    fn empty_prompts_do_not_count_as_drift() {
        let history = vec![
            event("src/a.rs", ""),
            event("src/b.rs", ""),
            event("src/c.rs", ""),
        ];
        let report = compute_entropy(&history, &policy());
        assert_eq!(report.drift_score, 0.0);
        assert!(report.signals.is_empty());
    }

    #[test]
    fn recommendation_is_appended_when_any_signal_fires() {
        let history = vec![
            event("src/loop.rs", "fix it"),
            event("src/loop.rs", "fix it"),
            event("src/loop.rs", "fix it"),
        ];
        let decision = check_entropy(&history, &policy());
        assert!(decision.allowed);
        assert!(decision
            .details
            .last()
            .is_some_and(|d| d.contains("plan-scoped")));
    }
}
