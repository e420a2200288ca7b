// rules.rs — Compilation of the policy document into a typed rule table.
//
// All pattern groups (prohibited code patterns, command block patterns,
// forbidden paths) are compiled once per policy load rather than searched
// ad hoc per check. An invalid pattern fails the whole load: a policy that
// cannot be compiled cannot be enforced, and an unenforceable policy must
// deny, not degrade.

use glob::Pattern;
use regex::Regex;

use crate::document::PolicyDocument;
use crate::error::PolicyError;

/// Which named group a compiled rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCategory {
    /// Placeholder/incompleteness markers.
    Placeholder,
    /// Mock/fake/demo data markers.
    Mock,
    /// Unsafe escape primitives.
    EscapePrimitive,
    /// Assumption/hack language.
    Assumption,
}

impl PatternCategory {
    /// Short name used as the prefix of a finding's pattern label.
    pub fn label(&self) -> &'static str {
        match self {
            PatternCategory::Placeholder => "placeholder",
            PatternCategory::Mock => "mock",
            PatternCategory::EscapePrimitive => "escape",
            PatternCategory::Assumption => "assumption",
        }
    }
}

/// One compiled prohibited-pattern rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Label reported in findings, e.g. `placeholder:\bTODO\b`.
    pub name: String,
    /// Which group the rule belongs to.
    pub category: PatternCategory,
    /// The compiled pattern.
    pub regex: Regex,
}

/// The policy document plus every pattern compiled and ready to match.
///
/// This is what [`crate::PolicyStore::load`] hands to the gates: an
/// immutable snapshot, built fresh per call, never shared across calls.
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    /// The raw document as loaded.
    pub document: PolicyDocument,
    /// Prohibited code rules across all four groups.
    pub code_rules: Vec<CompiledRule>,
    /// Command block patterns, in the document's declared order.
    pub command_rules: Vec<(String, Regex)>,
    /// Forbidden path globs, compiled with literal separators.
    pub forbidden_path_globs: Vec<(String, Pattern)>,
}

impl CompiledPolicy {
    /// Compile a document into a rule table. Fails on the first invalid
    /// pattern so a half-enforceable policy never reaches a gate.
    pub fn compile(document: PolicyDocument) -> Result<Self, PolicyError> {
        let mut code_rules = Vec::new();
        let groups = [
            (
                PatternCategory::Placeholder,
                &document.prohibited_patterns.placeholders,
            ),
            (PatternCategory::Mock, &document.prohibited_patterns.mocks),
            (
                PatternCategory::EscapePrimitive,
                &document.prohibited_patterns.escape_primitives,
            ),
            (
                PatternCategory::Assumption,
                &document.prohibited_patterns.assumptions,
            ),
        ];
        for (category, patterns) in groups {
            for pattern in patterns {
                let regex = compile_regex(category.label(), pattern)?;
                code_rules.push(CompiledRule {
                    name: format!("{}:{}", category.label(), pattern),
                    category,
                    regex,
                });
            }
        }

        let mut command_rules = Vec::new();
        for pattern in &document.command_block_patterns {
            let regex = compile_regex("command_block", pattern)?;
            command_rules.push((pattern.clone(), regex));
        }

        let mut forbidden_path_globs = Vec::new();
        for raw in &document.forbidden_paths {
            let pattern =
                Pattern::new(raw).map_err(|e| PolicyError::InvalidPattern {
                    group: "forbidden_paths".to_string(),
                    pattern: raw.clone(),
                    reason: e.to_string(),
                })?;
            forbidden_path_globs.push((raw.clone(), pattern));
        }

        Ok(Self {
            document,
            code_rules,
            command_rules,
            forbidden_path_globs,
        })
    }

    /// Whether a path matches any forbidden prefix or glob.
    ///
    /// Globs require literal separators so `src/*` never reaches into
    /// subdirectories, matching the write guard's expectations.
    pub fn path_is_forbidden(&self, path: &str) -> Option<&str> {
        let opts = glob::MatchOptions {
            require_literal_separator: true,
            ..Default::default()
        };
        for (raw, pattern) in &self.forbidden_path_globs {
            if pattern.matches_with(path, opts) {
                return Some(raw);
            }
            // A bare prefix entry like ".git" also covers everything below it.
            let prefix = raw.trim_end_matches("/**").trim_end_matches('/');
            if !prefix.contains('*') && (path == prefix || path.starts_with(&format!("{}/", prefix)))
            {
                return Some(raw);
            }
        }
        None
    }
}

fn compile_regex(group: &str, pattern: &str) -> Result<Regex, PolicyError> {
    Regex::new(pattern).map_err(|e| PolicyError::InvalidPattern {
        group: group.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_compiles() {
        let compiled = CompiledPolicy::compile(PolicyDocument::default()).unwrap();
        assert!(!compiled.code_rules.is_empty());
        assert!(!compiled.command_rules.is_empty());
        assert!(!compiled.forbidden_path_globs.is_empty());
    }

    #[test]
    fn invalid_regex_fails_compilation() {
        let mut doc = PolicyDocument::default();
        doc.command_block_patterns.push("([unclosed".to_string());
        let err = CompiledPolicy::compile(doc).unwrap_err();
        match err {
            PolicyError::InvalidPattern { group, .. } => assert_eq!(group, "command_block"),
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn command_rules_preserve_declared_order() {
        let mut doc = PolicyDocument::default();
        doc.command_block_patterns = vec!["first".to_string(), "second".to_string()];
        let compiled = CompiledPolicy::compile(doc).unwrap();
        assert_eq!(compiled.command_rules[0].0, "first");
        assert_eq!(compiled.command_rules[1].0, "second");
    }

    #[test]
    fn rule_names_carry_category_label() {
        let compiled = CompiledPolicy::compile(PolicyDocument::default()).unwrap();
        assert!(compiled
            .code_rules
            .iter()
            .any(|r| r.name.starts_with("placeholder:")));
        assert!(compiled
            .code_rules
            .iter()
            .any(|r| r.name.starts_with("escape:")));
    }

    #[test]
    fn forbidden_path_prefix_and_glob() {
        let compiled = CompiledPolicy::compile(PolicyDocument::default()).unwrap();
        assert!(compiled.path_is_forbidden(".git/config").is_some());
        assert!(compiled.path_is_forbidden(".vigil/policy.yaml").is_some());
        assert!(compiled.path_is_forbidden("certs/server.pem").is_some());
        assert!(compiled.path_is_forbidden("src/main.rs").is_none());
    }

    #[test]
    fn glob_requires_literal_separator() {
        let mut doc = PolicyDocument::default();
        doc.forbidden_paths = vec!["secrets/*".to_string()];
        let compiled = CompiledPolicy::compile(doc).unwrap();
        assert!(compiled.path_is_forbidden("secrets/key.txt").is_some());
        assert!(compiled.path_is_forbidden("secrets/sub/key.txt").is_none());
    }
}
