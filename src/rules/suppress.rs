//! Inline suppression of findings via comments.
//!
//! Supports suppression comments like:
//! - `// ftcfix:ignore <rule> - <reason>` (trailing: this line, alone: next line)
//! - `// ftcfix:ignore-next-line <rule> - <reason>`
//! - `// ftcfix:ignore-file <rule> - <reason>` (only in the leading comment block)
//!
//! `*` as the rule suppresses every rule.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Finding;

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionType {
    Line,
    NextLine,
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    /// Rule id or `*`.
    pub rule: String,
    pub reason: String,
    /// Line of the directive (0 for file-level).
    pub line: usize,
    pub suppression_type: SuppressionType,
}

lazy_static::lazy_static! {
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"//\s*ftcfix:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?")
            .expect("line comment pattern"),
        Regex::new(r"/\*\s*ftcfix:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*?))?\s*\*/")
            .expect("block comment pattern"),
    ];
}

/// Parse suppression directives from source text.
pub fn parse_suppressions(content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if in_header && !is_comment_or_empty(trimmed) {
            in_header = false;
        }

        let Some(caps) = SUPPRESSION_PATTERNS.iter().find_map(|p| p.captures(line)) else {
            continue;
        };
        let directive = caps.get(1).map_or("", |m| m.as_str());
        let rule = caps.get(2).map_or("", |m| m.as_str());
        let reason = caps
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let suppression_type = match directive {
            "ignore-file" if in_header => SuppressionType::File,
            "ignore-file" => continue,
            "ignore-next-line" => SuppressionType::NextLine,
            _ => {
                let before = caps.get(0).map_or("", |m| &line[..m.start()]);
                if before.trim().is_empty() {
                    SuppressionType::NextLine
                } else {
                    SuppressionType::Line
                }
            }
        };

        suppressions.push(Suppression {
            rule: rule.to_string(),
            reason,
            line: match suppression_type {
                SuppressionType::File => 0,
                _ => line_number,
            },
            suppression_type,
        });
    }

    suppressions
}

fn is_comment_or_empty(line: &str) -> bool {
    line.is_empty() || line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
}

/// Check if a finding matches a suppression.
pub fn matches_suppression(finding: &Finding, suppression: &Suppression) -> bool {
    if suppression.rule != "*" && suppression.rule != finding.rule.as_str() {
        return false;
    }

    match suppression.suppression_type {
        SuppressionType::File => true,
        SuppressionType::Line => finding.line == suppression.line,
        SuppressionType::NextLine => finding.line == suppression.line + 1,
    }
}

/// Separate findings into active and suppressed.
pub fn filter_suppressed(
    findings: Vec<Finding>,
    suppressions: &[Suppression],
) -> (Vec<Finding>, Vec<Finding>) {
    findings
        .into_iter()
        .partition(|f| !suppressions.iter().any(|s| matches_suppression(f, s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleId;
    use crate::syntax::{SourceDocument, Span};

    #[test]
    fn test_parse_suppressions() {
        let content = r#"// ftcfix:ignore-file unguarded_input_poll - driver practice code
package org.firstinspires.ftc.teamcode;

// ftcfix:ignore-file missing_start_signal - too late for file level
class A {
    // ftcfix:ignore-next-line uninitialized_hardware_field - bound in a helper
    DcMotor left;
    DcMotor right; // ftcfix:ignore *
}
"#;
        let suppressions = parse_suppressions(content);
        assert_eq!(suppressions.len(), 3);

        assert_eq!(suppressions[0].suppression_type, SuppressionType::File);
        assert_eq!(suppressions[0].reason, "driver practice code");

        assert_eq!(suppressions[1].suppression_type, SuppressionType::NextLine);
        assert_eq!(suppressions[1].line, 6);

        assert_eq!(suppressions[2].suppression_type, SuppressionType::Line);
        assert_eq!(suppressions[2].rule, "*");
    }

    #[test]
    fn test_filter_suppressed() {
        let doc = SourceDocument::parse("class A {\n  DcMotor left;\n  DcMotor right;\n}\n").unwrap();
        let left = Finding::new(RuleId::UninitializedHardwareField, &doc, Span::new(20, 24), "left");
        let right = Finding::new(RuleId::UninitializedHardwareField, &doc, Span::new(36, 41), "right");

        let suppressions = vec![Suppression {
            rule: "uninitialized_hardware_field".to_string(),
            reason: String::new(),
            line: 1,
            suppression_type: SuppressionType::NextLine,
        }];
        let (active, suppressed) = filter_suppressed(vec![left, right], &suppressions);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "right");
        assert_eq!(suppressed[0].message, "left");
    }
}
