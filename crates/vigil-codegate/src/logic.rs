// logic.rs — Logic-preservation heuristic.
//
// Counts recognizable executable statements in the old and new content of
// each edit and sums the deltas over the whole edit set. A statement is a
// non-blank line that is not a comment and not punctuation-only. This is a
// line heuristic, not a parser: it overcounts in places (a multi-line
// expression counts per line) and that is acceptable. What it must never do
// is silently miss a wholesale deletion of logic.

use vigil_protocol::ProposedEdit;

/// Net change in executable statements across the edit set.
/// Negative means the edits delete more logic than they add.
pub fn logic_delta(edits: &[ProposedEdit]) -> i64 {
    edits
        .iter()
        .map(|e| {
            executable_statements(&e.new_content) as i64
                - executable_statements(&e.old_content) as i64
        })
        .sum()
}

/// Count lines that plausibly carry an executable statement.
pub fn executable_statements(text: &str) -> usize {
    text.lines().filter(|l| is_executable(l)).count()
}

fn is_executable(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    // Line comments across the languages agents commonly touch.
    if trimmed.starts_with("//")
        || trimmed.starts_with('#')
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("--")
    {
        return false;
    }
    // Punctuation-only lines (closing braces, lone semicolons).
    if trimmed.chars().all(|c| "{}()[];,".contains(c)) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_plain_statements() {
        let text = "let a = 1;\nlet b = 2;\n\n// comment\n}\n";
        assert_eq!(executable_statements(text), 2);
    }

    #[test]
    fn hash_and_block_comments_excluded() {
        let text = "# python comment\n/* c comment\n * continued\nx = 1\n";
        assert_eq!(executable_statements(text), 1);
    }

    #[test]
    fn delta_negative_on_deletion() {
        let edits = vec![ProposedEdit {
            path: "f.rs".to_string(),
            old_content: "a();\nb();\nc();\n".to_string(),
            new_content: "a();\n".to_string(),
        }];
        assert_eq!(logic_delta(&edits), -2);
    }

    #[test]
    fn delta_zero_for_comment_only_changes() {
        let edits = vec![ProposedEdit {
            path: "f.rs".to_string(),
            old_content: "a();\n".to_string(),
            new_content: "// explains a\na();\n".to_string(),
        }];
        assert_eq!(logic_delta(&edits), 0);
    }

    #[test]
    fn empty_old_content_counts_as_pure_growth() {
        let edits = vec![ProposedEdit {
            path: "new.rs".to_string(),
            old_content: String::new(),
            new_content: "fn f() {\n    g();\n}\n".to_string(),
        }];
        assert!(logic_delta(&edits) > 0);
    }
}
