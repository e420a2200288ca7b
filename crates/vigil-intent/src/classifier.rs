// classifier.rs — Weighted keyword scoring over intent categories.
//
// A pure scoring function: no I/O, no denial path. Each category has a
// small vocabulary of weighted patterns; a prompt's score per category is
// the sum of matched weights, normalized by the total matched weight so
// confidence is comparable across prompts. Downstream components use the
// high-confidence flag to decide whether to require an explicit
// acknowledgment token; that consumer is outside this crate.

use serde::{Deserialize, Serialize};
use vigil_policy::CompiledPolicy;

/// The fixed set of intent categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Writing or extending code.
    CodeWrite,
    /// Fixing a defect in existing behavior.
    Repair,
    /// Reviewing/inspecting without changing.
    Audit,
    /// Open-ended exploration of the codebase.
    Explore,
}

impl IntentCategory {
    /// All categories, in scoring order.
    pub const ALL: [IntentCategory; 4] = [
        IntentCategory::CodeWrite,
        IntentCategory::Repair,
        IntentCategory::Audit,
        IntentCategory::Explore,
    ];

    /// Vocabulary this category matches on, with weights.
    fn vocabulary(&self) -> &'static [(&'static str, f64)] {
        match self {
            IntentCategory::CodeWrite => &[
                ("implement", 3.0),
                ("add", 2.0),
                ("write", 2.0),
                ("create", 2.0),
                ("build", 2.0),
                ("refactor", 1.5),
                ("feature", 1.5),
            ],
            IntentCategory::Repair => &[
                ("fix", 3.0),
                ("bug", 3.0),
                ("broken", 2.0),
                ("fail", 2.0),
                ("error", 1.5),
                ("crash", 2.0),
                ("regression", 2.0),
            ],
            IntentCategory::Audit => &[
                ("review", 3.0),
                ("audit", 3.0),
                ("check", 1.5),
                ("verify", 2.0),
                ("inspect", 2.0),
                ("security", 1.5),
            ],
            IntentCategory::Explore => &[
                ("explain", 2.5),
                ("what", 1.0),
                ("how", 1.0),
                ("where", 1.0),
                ("understand", 2.0),
                ("find", 1.5),
                ("show", 1.5),
            ],
        }
    }

    /// Keywords associated with this category, for semantic-overlap checks.
    pub fn keywords(&self) -> Vec<&'static str> {
        self.vocabulary().iter().map(|(w, _)| *w).collect()
    }
}

impl std::fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentCategory::CodeWrite => write!(f, "code_write"),
            IntentCategory::Repair => write!(f, "repair"),
            IntentCategory::Audit => write!(f, "audit"),
            IntentCategory::Explore => write!(f, "explore"),
        }
    }
}

/// The classifier's output: a winner, its confidence, and all scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    /// The highest-scoring category.
    pub category: IntentCategory,
    /// Winner's share of the total matched weight, in [0, 1].
    pub confidence: f64,
    /// Raw score per category, in [`IntentCategory::ALL`] order.
    pub scores: Vec<(IntentCategory, f64)>,
    /// Whether confidence met the policy threshold.
    pub high_confidence: bool,
}

/// Score a prompt. Always returns a result; never denies.
pub fn classify(prompt: &str, policy: &CompiledPolicy) -> Classification {
    let lower = prompt.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut scores = Vec::with_capacity(IntentCategory::ALL.len());
    let mut total = 0.0;
    for category in IntentCategory::ALL {
        let mut score = 0.0;
        for (keyword, weight) in category.vocabulary() {
            if words.iter().any(|w| w == keyword) {
                score += weight;
            }
        }
        total += score;
        scores.push((category, score));
    }

    // An unmatched prompt defaults to Explore with zero confidence.
    let (category, best) = scores
        .iter()
        .copied()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .filter(|(_, s)| *s > 0.0)
        .unwrap_or((IntentCategory::Explore, 0.0));

    let confidence = if total > 0.0 { best / total } else { 0.0 };
    let high_confidence =
        confidence >= policy.document.thresholds.intent_confidence_threshold;

    tracing::debug!(%category, confidence, "prompt classified");
    Classification {
        category,
        confidence,
        scores,
        high_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_policy::PolicyDocument;

    fn policy() -> CompiledPolicy {
        CompiledPolicy::compile(PolicyDocument::default()).unwrap()
    }

    #[test]
    fn repair_prompt_classified() {
        let c = classify("fix the bug causing the crash on startup", &policy());
        assert_eq!(c.category, IntentCategory::Repair);
        assert!(c.confidence > 0.5);
    }

    #[test]
    fn code_write_prompt_classified() {
        let c = classify("implement a new feature to create reports", &policy());
        assert_eq!(c.category, IntentCategory::CodeWrite);
    }

    #[test]
    fn empty_prompt_defaults_to_explore_zero_confidence() {
        let c = classify("", &policy());
        assert_eq!(c.category, IntentCategory::Explore);
        assert_eq!(c.confidence, 0.0);
        assert!(!c.high_confidence);
    }

    #[test]
    fn all_scores_reported() {
        let c = classify("review and fix", &policy());
        assert_eq!(c.scores.len(), 4);
    }

    #[test]
    fn high_confidence_uses_policy_threshold() {
        let mut doc = PolicyDocument::default();
        doc.thresholds.intent_confidence_threshold = 0.99;
        let strict = CompiledPolicy::compile(doc).unwrap();
        // A mixed prompt cannot reach 0.99.
        let c = classify("fix the bug and implement the feature", &strict);
        assert!(!c.high_confidence);
        // A single-category prompt reaches 1.0.
        let c = classify("fix the bug", &strict);
        assert!(c.high_confidence);
    }

    #[test]
    fn classification_is_pure() {
        let p = policy();
        let a = classify("audit the security of the login flow", &p);
        let b = classify("audit the security of the login flow", &p);
        assert_eq!(a, b);
        assert_eq!(a.category, IntentCategory::Audit);
    }
}
